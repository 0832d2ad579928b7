use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};
use log::{error, info};

/// Handles the DELE (Delete File) FTP command.
///
/// # Arguments
///
/// * `ctx` - The dispatch context.
/// * `arg` - The file to delete.
pub fn handle_dele_command(ctx: &mut CommandContext<'_>, arg: Option<&str>) -> HandlerResult {
    let Some(file) = arg else {
        ctx.session.replies.reply(501, "No file name");
        return Ok(());
    };

    if !ctx.store.probe(file) {
        ctx.session
            .replies
            .reply(550, format!("File {} not found", file));
        return Ok(());
    }

    match ctx.store.remove(file) {
        Ok(()) => {
            info!("File deleted: {}", file);
            ctx.session.replies.reply(250, format!("\"{}\" deleted", file));
        }
        Err(e) => {
            error!("Failed to delete file: {}, error: {}", file, e);
            ctx.session
                .replies
                .reply(450, format!("Can't delete {}", file));
        }
    }
    Ok(())
}
