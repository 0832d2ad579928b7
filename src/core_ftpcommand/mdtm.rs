use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};
use crate::core_reply::listing::timestamp;
use chrono::NaiveDateTime;
use log::{info, warn};

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if s.len() != 14 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDateTime::parse_from_str(s, "%Y%m%d%H%M%S").ok()
}

/// Handles the MDTM FTP command (RFC 3659).
///
/// * `MDTM <file>` reports the modification time as `YYYYMMDDHHMMSS`.
/// * `MDTM <YYYYMMDDHHMMSS> <file>` sets it.
/// * `MDTM <YYYYMMDDHHMMSS>` alone is acknowledged with `200 Ok`.
pub fn handle_mdtm_command(ctx: &mut CommandContext<'_>, arg: Option<&str>) -> HandlerResult {
    let Some(arg) = arg else {
        ctx.session.replies.reply(501, "No file name");
        return Ok(());
    };

    if arg.len() == 14 && arg.bytes().all(|b| b.is_ascii_digit()) {
        ctx.session.replies.reply(200, "Ok");
        return Ok(());
    }

    if let Some((stamp, file)) = arg.split_once(' ') {
        if let Some(time) = parse_timestamp(stamp) {
            return set_time(ctx, file, time);
        }
    }

    if !ctx.store.probe(arg) {
        ctx.session
            .replies
            .reply(550, format!("No such file {}", arg));
        return Ok(());
    }

    match ctx.store.modified(arg) {
        Ok(time) => ctx.session.replies.reply(213, timestamp(&time)),
        Err(e) => {
            warn!("MDTM {} failed: {}", arg, e);
            ctx.session.replies.reply(550, "Unable to retrieve time");
        }
    }
    Ok(())
}

fn set_time(ctx: &mut CommandContext<'_>, file: &str, time: NaiveDateTime) -> HandlerResult {
    if !ctx.store.probe(file) {
        ctx.session
            .replies
            .reply(550, format!("No such file {}", file));
        return Ok(());
    }
    ctx.store.set_modified(file, time)?;
    info!("Modification time of {} set to {}", file, time);
    ctx.session.replies.reply(213, "Modification time set.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("20240131235959").is_some());
        assert!(parse_timestamp("20241331235959").is_none());
        assert!(parse_timestamp("2024013123595").is_none());
        assert!(parse_timestamp("2024013123595x").is_none());
    }
}
