use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};

/// Handles the SIZE FTP command (RFC 3659).
pub fn handle_size_command(ctx: &mut CommandContext<'_>, arg: Option<&str>) -> HandlerResult {
    let Some(file) = arg else {
        ctx.session.replies.reply(501, "No file name");
        return Ok(());
    };

    if !ctx.store.probe(file) || ctx.store.is_dir(file) {
        ctx.session
            .replies
            .reply(550, format!("No such file {}", file));
        return Ok(());
    }

    let size = ctx.store.size(file)?;
    ctx.session.replies.reply(213, size);
    Ok(())
}
