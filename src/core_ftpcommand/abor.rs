use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};
use crate::session::Task;
use log::info;

/// Handles the ABOR FTP command.
///
/// Any data channel and transfer are released by the disconnect that
/// follows.
pub fn handle_abor_command(ctx: &mut CommandContext<'_>) -> HandlerResult {
    info!("FTP Server 'ABOR'");
    ctx.session.close_data(&mut *ctx.transport);
    ctx.session.replies.reply(226, "Data connection closed");
    ctx.session.task = Task::Disconnect;
    Ok(())
}
