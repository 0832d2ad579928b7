use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};
use crate::session::Task;
use log::{info, warn};

/// Handles the USER FTP command while waiting for the user identity.
///
/// A matching name moves the session to the password state; anything else
/// is answered with `530` and the session is torn down.
///
/// # Arguments
///
/// * `ctx` - The dispatch context.
/// * `username` - The username provided by the client.
pub fn handle_user_command(ctx: &mut CommandContext<'_>, username: Option<&str>) -> HandlerResult {
    let username = username.unwrap_or("");
    info!("Received USER command with username: {}", username);

    if username == ctx.config.server.username {
        ctx.session.user = Some(username.to_string());
        ctx.session
            .replies
            .reply(331, format!("OK. {} User password required", username));
        ctx.session.task = Task::Password;
    } else {
        warn!("FTP Server user NG: '{}'", username);
        ctx.session
            .replies
            .reply(530, format!("{} User not found", username));
        ctx.session.task = Task::Disconnect;
    }
    Ok(())
}
