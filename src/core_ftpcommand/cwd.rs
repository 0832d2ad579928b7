use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};
use log::{debug, warn};

/// Handles the CWD (Change Working Directory) FTP command.
///
/// `CWD .` is answered like PWD without touching the store.
pub fn handle_cwd_command(ctx: &mut CommandContext<'_>, arg: Option<&str>) -> HandlerResult {
    let Some(dir) = arg else {
        ctx.session.replies.reply(501, "No directory name");
        return Ok(());
    };

    if dir == "." {
        ctx.session
            .replies
            .reply(257, format!("\"{}\" is your current directory", dir));
        return Ok(());
    }

    match ctx.store.cd(dir) {
        Ok(()) => {
            let current = ctx.store.current();
            debug!("Current Path: '{}'", current);
            ctx.session
                .replies
                .reply(250, format!("Ok. Current directory is '{}'", current));
        }
        Err(e) => {
            warn!("CWD {} failed: {}", dir, e);
            ctx.session
                .replies
                .reply(550, format!("Can't change directory to '{}'", dir));
        }
    }
    Ok(())
}
