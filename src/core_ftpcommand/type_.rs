use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};
use log::debug;

/// Handles the TYPE FTP command.
///
/// Only `A` and `I` are accepted. Data is always moved as-is, so the
/// answer is all that changes.
///
/// # Arguments
///
/// * `arg` - The requested representation type.
pub fn handle_type_command(ctx: &mut CommandContext<'_>, arg: Option<&str>) -> HandlerResult {
    match arg {
        Some("A") => {
            ctx.session.replies.reply(200, "TYPE is now ASCII");
        }
        Some("I") => {
            ctx.session.replies.reply(200, "TYPE is now BINARY");
        }
        other => {
            debug!("TYPE {:?} rejected", other);
            ctx.session.replies.reply(504, "Unknown TYPE");
        }
    }
    Ok(())
}
