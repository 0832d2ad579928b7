use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};
use crate::session::Task;
use log::{error, info};

/// Handles the RNTO FTP command, completing a rename started by RNFR.
///
/// # Arguments
///
/// * `ctx` - The dispatch context, holding the pending RNFR source.
/// * `arg` - The new name.
///
/// # Returns
///
/// Always `Ok`; every failure is answered in place.
pub fn handle_rnto_command(ctx: &mut CommandContext<'_>, arg: Option<&str>) -> HandlerResult {
    let from = ctx.session.rename_from.take();
    ctx.session.task = Task::Command;

    let Some(from) = from else {
        ctx.session.replies.reply(503, "Need RNFR before RNTO");
        return Ok(());
    };
    let Some(to) = arg else {
        ctx.session.replies.reply(501, "No file name");
        return Ok(());
    };

    if ctx.store.probe(to) {
        ctx.session
            .replies
            .reply(553, format!("{} already exists", to));
        return Ok(());
    }

    match ctx.store.rename(&from, to) {
        Ok(()) => {
            info!("Renamed {} to {}", from, to);
            ctx.session
                .replies
                .reply(250, "File successfully renamed or moved");
        }
        Err(e) => {
            error!("Rename {} -> {} failed: {}", from, to, e);
            ctx.session.replies.reply(451, "Rename/move failure");
        }
    }
    Ok(())
}
