use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};
use log::warn;

/// Handles the SITE FTP command. `SITE FREE` is the only subcommand.
pub fn handle_site_command(ctx: &mut CommandContext<'_>, arg: Option<&str>) -> HandlerResult {
    let arg = arg.unwrap_or("");
    if arg != "FREE" {
        ctx.session
            .replies
            .reply(500, format!("Unknown SITE command {}", arg));
        return Ok(());
    }

    match ctx.store.disk_space() {
        Ok(space) => ctx.session.replies.reply(
            200,
            format!(
                "{} MB free of {} MB capacity",
                space.free_mb(),
                space.capacity_mb()
            ),
        ),
        Err(e) => {
            warn!("SITE FREE: {}", e);
            ctx.session.replies.reply(550, "disk not available");
        }
    }
    Ok(())
}
