use crate::config::Config;
use crate::core_fs::FileStore;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::ftpcommand::{Command, FtpCommand};
use crate::core_ftpcommand::{
    abor, cdup, cwd, dele, feat, help, list, mdtm, mkd, noop, pwd, quit, retr, rmd, rnfr, rnto,
    site, size, stor, stru, syst, type_,
};
use crate::core_network::data_channel::{DataChannel, DataState};
use crate::core_network::transport::{SocketHandle, Transport};
use crate::core_network::{pasv, port};
use crate::core_reply::ListFormat;
use crate::session::{Session, Task};
use log::{debug, error, warn};

pub type HandlerResult = Result<(), FtpError>;

/// Everything a command handler may touch during one dispatch.
pub struct CommandContext<'a> {
    pub config: &'a Config,
    pub session: &'a mut Session,
    pub store: &'a mut dyn FileStore,
    pub transport: &'a mut dyn Transport,
}

/// Parses `line` and runs the matching handler.
///
/// Handler errors are logged and answered with their FTP reply; the session
/// goes on.
pub fn dispatch(ctx: &mut CommandContext<'_>, line: &str) {
    let Some(command) = Command::parse(line) else {
        debug!("FTP Server: command table search out: '{}'", line);
        unknown(ctx, line);
        return;
    };
    debug!("FTP command: {}, {:?}", command.kind.keyword(), command.arg);

    let arg = command.non_empty_arg();
    let result = match command.kind {
        FtpCommand::ABOR => abor::handle_abor_command(ctx),
        FtpCommand::CDUP => cdup::handle_cdup_command(ctx),
        FtpCommand::CWD => cwd::handle_cwd_command(ctx, arg),
        FtpCommand::DELE => dele::handle_dele_command(ctx, arg),
        FtpCommand::FEAT => feat::handle_feat_command(ctx),
        FtpCommand::HELP => help::handle_help_command(ctx),
        FtpCommand::LIST => list::handle_list_command(ctx, arg, ListFormat::List),
        FtpCommand::NLST => list::handle_list_command(ctx, arg, ListFormat::Nlst),
        FtpCommand::MLSD => list::handle_list_command(ctx, arg, ListFormat::Mlsd),
        FtpCommand::MDTM => mdtm::handle_mdtm_command(ctx, arg),
        FtpCommand::MKD => mkd::handle_mkd_command(ctx, arg),
        FtpCommand::NOOP => noop::handle_noop_command(ctx),
        FtpCommand::PASV => pasv::handle_pasv_command(ctx),
        FtpCommand::PORT => port::handle_port_command(ctx, arg),
        FtpCommand::PWD | FtpCommand::XPWD => pwd::handle_pwd_command(ctx),
        FtpCommand::QUIT => quit::handle_quit_command(ctx),
        FtpCommand::RETR => retr::handle_retr_command(ctx, arg),
        FtpCommand::RMD => rmd::handle_rmd_command(ctx, arg),
        FtpCommand::RNFR => rnfr::handle_rnfr_command(ctx, arg),
        FtpCommand::RNTO => rnto::handle_rnto_command(ctx, arg),
        FtpCommand::SITE => site::handle_site_command(ctx, arg),
        FtpCommand::SIZE => size::handle_size_command(ctx, arg),
        FtpCommand::STOR => stor::handle_stor_command(ctx, arg),
        FtpCommand::STRU => stru::handle_stru_command(ctx, arg),
        FtpCommand::SYST => syst::handle_syst_command(ctx),
        FtpCommand::TYPE => type_::handle_type_command(ctx, arg),
        FtpCommand::USER | FtpCommand::PASS => {
            ctx.session.replies.reply(503, "Already logged in");
            Ok(())
        }
        kind => {
            if kind.is_unsupported() {
                debug!("Not service: '{}'", line);
            }
            unknown(ctx, line);
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("{} failed: {}", command.kind.keyword(), e);
        ctx.session.replies.line(&e.to_ftp_response());
    }
}

pub fn unknown(ctx: &mut CommandContext<'_>, line: &str) {
    ctx.session
        .replies
        .reply(500, format!("Unknown command {}", line));
}

/// The connected data socket, or a `425` reply.
///
/// A channel that exists but is not connected is scheduled for closing.
pub fn require_data(ctx: &mut CommandContext<'_>) -> Option<SocketHandle> {
    match DataChannel::state(ctx.session.data.as_ref(), &mut *ctx.transport) {
        DataState::Ready(handle) => Some(handle),
        DataState::Missing => {
            ctx.session.replies.reply(425, "No data connection");
            None
        }
        DataState::Unusable => {
            warn!("data channel present but not connected");
            ctx.session.replies.reply(425, "No data connection");
            ctx.session.task = Task::ClosePort;
            None
        }
    }
}
