use crate::core_auth::verify_password;
use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};
use crate::session::Task;
use log::{info, warn};

/// Handles the PASS FTP command, valid only right after an accepted USER.
pub fn handle_pass_command(ctx: &mut CommandContext<'_>, password: Option<&str>) -> HandlerResult {
    let user = ctx.session.user.clone().unwrap_or_default();

    if verify_password(password.unwrap_or(""), &ctx.config.server.password) {
        info!("FTP Server password OK: '{}'", user);
        ctx.session.replies.reply(230, format!("Login ok {}", user));
        ctx.session.task = Task::Command;
    } else {
        warn!("FTP Server password NG: '{}'", user);
        ctx.session
            .replies
            .reply(530, format!("Password fail {}", user));
        ctx.session.task = Task::Disconnect;
    }
    Ok(())
}
