use crate::core_ftpcommand::handlers::{require_data, CommandContext, HandlerResult};
use crate::core_transfer::TransferJob;
use crate::session::Task;
use log::{error, info};

/// Handles the STOR (Store File) FTP command.
///
/// The file is created relative to the store's current directory and filled
/// one chunk per tick. The upload ends when the client closes the data
/// connection.
///
/// # Arguments
///
/// * `ctx` - The dispatch context.
/// * `arg` - The name of the file to be stored.
pub fn handle_stor_command(ctx: &mut CommandContext<'_>, arg: Option<&str>) -> HandlerResult {
    let Some(handle) = require_data(ctx) else {
        return Ok(());
    };

    let Some(file) = arg else {
        ctx.session.replies.reply(501, "No file name");
        ctx.session.task = Task::ClosePort;
        return Ok(());
    };

    let writer = match ctx.store.open_write(file) {
        Ok(writer) => writer,
        Err(e) => {
            error!("Failed to create {}: {}", file, e);
            ctx.session
                .replies
                .reply(451, format!("Can't open/create {}", file));
            ctx.session.task = Task::ClosePort;
            return Ok(());
        }
    };

    let port = ctx.transport.local_port(handle).unwrap_or(0);
    ctx.session
        .replies
        .reply(150, format!("Connected to port {}", port));
    info!("STOR {}", file);

    ctx.session.transfer = Some(TransferJob::upload(
        writer,
        ctx.config.server.transfer_chunk_size,
    ));
    ctx.session.task = Task::RecvFile;
    Ok(())
}
