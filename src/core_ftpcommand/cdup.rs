use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};
use log::warn;

/// Handles the CDUP FTP command. At the root it stays at the root.
pub fn handle_cdup_command(ctx: &mut CommandContext<'_>) -> HandlerResult {
    if let Err(e) = ctx.store.cd("..") {
        warn!("CDUP failed: {}", e);
    }
    let current = ctx.store.current();
    ctx.session
        .replies
        .reply(200, format!("Ok. Current directory is {}", current));
    Ok(())
}
