use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};

/// Handles the STRU FTP command. Only file structure is supported.
pub fn handle_stru_command(ctx: &mut CommandContext<'_>, arg: Option<&str>) -> HandlerResult {
    match arg {
        Some("F") => ctx.session.replies.reply(200, "F Ok"),
        other => ctx
            .session
            .replies
            .reply(504, format!("No support {}", other.unwrap_or(""))),
    }
    Ok(())
}
