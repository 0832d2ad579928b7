use crate::core_ftpcommand::handlers::{require_data, CommandContext, HandlerResult};
use crate::core_reply::listing::{self, ListFormat};
use crate::core_transfer::TransferJob;
use crate::session::Task;
use log::{debug, warn};

/// Handles the LIST, NLST and MLSD FTP commands.
///
/// The listing is rendered up front and then streamed over the data channel
/// chunk by chunk, like a file download. Option arguments (`-la`) are
/// ignored; any other argument names the directory to list.
///
/// # Arguments
///
/// * `ctx` - The dispatch context.
/// * `arg` - Optional directory or `ls` options.
/// * `format` - Which listing encoding to produce.
pub fn handle_list_command(
    ctx: &mut CommandContext<'_>,
    arg: Option<&str>,
    format: ListFormat,
) -> HandlerResult {
    if require_data(ctx).is_none() {
        return Ok(());
    }
    ctx.session.replies.reply(150, "Accepted data connection");

    let target = match arg.map(str::trim) {
        Some(a) if !a.is_empty() && !a.starts_with('-') => a.to_string(),
        _ => ctx.store.current(),
    };

    let mut body = String::new();
    let result = ctx
        .store
        .dir_loop(&target, &mut |entry| listing::encode(format, entry, &mut body));

    match result {
        Ok(count) => {
            debug!("{:?} {}: {} entries", format, target, count);
            ctx.session.transfer = Some(TransferJob::listing(
                body,
                count,
                format == ListFormat::Mlsd,
                ctx.config.server.transfer_chunk_size,
            ));
            ctx.session.task = Task::SendFile;
        }
        Err(e) => {
            warn!("listing {} failed: {}", target, e);
            ctx.session
                .replies
                .reply(550, format!("Can't open directory {}", target));
            ctx.session.task = Task::ClosePort;
        }
    }
    Ok(())
}
