use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};
use crate::session::Task;

/// Handles the RNFR FTP command: remembers the source and waits for RNTO.
pub fn handle_rnfr_command(ctx: &mut CommandContext<'_>, arg: Option<&str>) -> HandlerResult {
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

    ctx.session.rename_from = Some(file.to_string());
    ctx.session
        .replies
        .reply(350, "RNFR accepted - file exists, ready for destination");
    ctx.session.task = Task::RecvRename;
    Ok(())
}
