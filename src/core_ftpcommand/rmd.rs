use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};
use log::{error, info};

/// Handles the RMD (Remove Directory) FTP command.
pub fn handle_rmd_command(ctx: &mut CommandContext<'_>, arg: Option<&str>) -> HandlerResult {
    let Some(dir) = arg else {
        ctx.session.replies.reply(501, "No directory name");
        return Ok(());
    };

    if !ctx.store.probe(dir) {
        ctx.session
            .replies
            .reply(550, format!("File {} not found", dir));
        return Ok(());
    }

    match ctx.store.remove(dir) {
        Ok(()) => {
            info!("Directory removed: {}", dir);
            ctx.session.replies.reply(250, format!("\"{}\" deleted", dir));
        }
        Err(e) => {
            error!("Failed to remove directory: {}, error: {}", dir, e);
            ctx.session
                .replies
                .reply(550, format!("Can't delete {}", dir));
        }
    }
    Ok(())
}
