use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};

/// Handles the SYST FTP command, also accepted before login.
pub fn handle_syst_command(ctx: &mut CommandContext<'_>) -> HandlerResult {
    ctx.session.replies.reply(
        215,
        format!("{} single task OS.", ctx.config.server.system_name),
    );
    Ok(())
}
