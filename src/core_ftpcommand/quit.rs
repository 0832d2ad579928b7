use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};
use crate::session::Task;
use log::info;

/// Handles the QUIT FTP command: says goodbye and tears the session down.
pub fn handle_quit_command(ctx: &mut CommandContext<'_>) -> HandlerResult {
    info!("FTP Server 'QUIT'");
    ctx.session.replies.reply(221, "Goodbye");
    ctx.session.task = Task::Disconnect;
    Ok(())
}
