use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};

/// Handles the PWD and XPWD FTP commands.
pub fn handle_pwd_command(ctx: &mut CommandContext<'_>) -> HandlerResult {
    let current = ctx.store.current();
    ctx.session
        .replies
        .reply(257, format!("\"{}\" is your current directory", current));
    Ok(())
}
