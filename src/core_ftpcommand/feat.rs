use crate::constants::FEAT_EXTENSIONS;
use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};

/// Handles the FEAT FTP command (RFC 2389).
pub fn handle_feat_command(ctx: &mut CommandContext<'_>) -> HandlerResult {
    let replies = &mut ctx.session.replies;
    replies.continued(211, "Extensions supported:");
    for ext in FEAT_EXTENSIONS {
        replies.line(&format!(" {}", ext));
    }
    replies.reply(211, "End.");
    Ok(())
}
