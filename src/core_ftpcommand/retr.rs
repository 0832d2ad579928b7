use crate::core_ftpcommand::handlers::{require_data, CommandContext, HandlerResult};
use crate::core_transfer::TransferJob;
use crate::session::Task;
use log::{error, info};

/// Handles the RETR (Retrieve) FTP command.
///
/// The data channel is checked before anything else, so a RETR without one
/// never opens the file. On success a transfer job is queued and the session
/// moves to `SendFile`; the bytes go out one chunk per tick.
///
/// # Arguments
///
/// * `ctx` - The dispatch context.
/// * `arg` - The name of the file to retrieve.
///
/// # Returns
///
/// `Err` only when the store can't size a file it just found. The data
/// channel is released and the dispatcher answers with the matching reply.
pub fn handle_retr_command(ctx: &mut CommandContext<'_>, arg: Option<&str>) -> HandlerResult {
    let Some(handle) = require_data(ctx) else {
        return Ok(());
    };

    let Some(file) = arg else {
        ctx.session.replies.reply(501, "No file name");
        ctx.session.task = Task::ClosePort;
        return Ok(());
    };

    if !ctx.store.probe(file) || ctx.store.is_dir(file) {
        ctx.session
            .replies
            .reply(550, format!("File '{}' not found", file));
        ctx.session.task = Task::ClosePort;
        return Ok(());
    }

    let size = match ctx.store.size(file) {
        Ok(size) => size,
        Err(e) => {
            ctx.session.task = Task::ClosePort;
            return Err(e.into());
        }
    };
    let reader = match ctx.store.open_read(file) {
        Ok(reader) => reader,
        Err(e) => {
            error!("Failed to open {}: {}", file, e);
            ctx.session.replies.reply(450, format!("Can't open {}", file));
            ctx.session.task = Task::ClosePort;
            return Ok(());
        }
    };

    let port = ctx.transport.local_port(handle).unwrap_or(0);
    ctx.session
        .replies
        .continued(150, format!("Connected to port {}", port));
    ctx.session
        .replies
        .reply(150, format!("{} bytes to download", size));
    info!("RETR {} ({} bytes)", file, size);

    ctx.session.transfer = Some(TransferJob::download(
        reader,
        ctx.config.server.transfer_chunk_size,
    ));
    ctx.session.task = Task::SendFile;
    Ok(())
}
