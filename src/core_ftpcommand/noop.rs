use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};

/// Handles the NOOP FTP command.
pub fn handle_noop_command(ctx: &mut CommandContext<'_>) -> HandlerResult {
    ctx.session.replies.reply(200, "NOOP ok");
    Ok(())
}
