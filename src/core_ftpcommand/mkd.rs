use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};
use log::{error, info, warn};

/// Handles the MKD (Make Directory) FTP command.
///
/// The directory is created relative to the current directory of the store,
/// which keeps it inside the served root.
///
/// # Arguments
///
/// * `ctx` - The dispatch context.
/// * `arg` - The directory name to create.
pub fn handle_mkd_command(ctx: &mut CommandContext<'_>, arg: Option<&str>) -> HandlerResult {
    let Some(dir) = arg else {
        ctx.session.replies.reply(501, "No directory name");
        return Ok(());
    };

    if ctx.store.probe(dir) {
        warn!("Directory already exists: {}", dir);
        ctx.session
            .replies
            .reply(521, format!("\"{}\" directory already exists", dir));
        return Ok(());
    }

    match ctx.store.mkdir(dir) {
        Ok(()) => {
            info!("Directory created successfully: {}", dir);
            ctx.session.replies.reply(257, format!("\"{}\" created", dir));
        }
        Err(e) => {
            error!("Failed to create directory: {}, error: {}", dir, e);
            ctx.session
                .replies
                .reply(550, format!("Can't create \"{}\"", dir));
        }
    }
    Ok(())
}
