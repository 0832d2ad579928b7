use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};

/// Handles the HELP FTP command. There is no command list to show.
pub fn handle_help_command(ctx: &mut CommandContext<'_>) -> HandlerResult {
    ctx.session.replies.reply(214, "Help list none...");
    Ok(())
}
