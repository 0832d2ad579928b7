use crate::clock::Clock;
use crate::config::Config;
use crate::constants::CONTROL_READ_CHUNK;
use crate::core_fs::FileStore;
use crate::core_ftpcommand::ftpcommand::{Command, FtpCommand};
use crate::core_ftpcommand::handlers::{self, CommandContext, HandlerResult};
use crate::core_ftpcommand::{pass, quit, syst, user};
use crate::core_network::error::TransportError;
use crate::core_network::transport::{Role, SocketOptions, Transport};
use crate::core_network::{pasv, port};
use crate::core_transfer::{Completion, Step};
use crate::session::{Session, Task};
use log::{debug, error, info, warn};
use std::net::Ipv4Addr;
use std::sync::Arc;

/// One FTP control connection driven by [`FtpServer::service`].
///
/// The engine owns its transport, file store and clock. Every call to
/// `service` performs a bounded amount of work and returns; waiting is
/// expressed by staying in a state until a later tick.
pub struct FtpServer<T: Transport, F: FileStore, C: Clock> {
    config: Arc<Config>,
    transport: T,
    store: F,
    clock: C,
    session: Session,
    ticks: u64,
}

impl<T: Transport, F: FileStore, C: Clock> FtpServer<T, F, C> {
    pub fn new(config: Arc<Config>, transport: T, store: F, clock: C) -> Self {
        let session = Session::new(config.server.line_capacity);
        Self {
            config,
            transport,
            store,
            clock,
            session,
            ticks: 0,
        }
    }

    pub fn task(&self) -> Task {
        self.session.task
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn store(&self) -> &F {
        &self.store
    }

    /// Runs one tick.
    pub fn service(&mut self) {
        self.ticks += 1;
        self.transport.service();

        if self.session.task.reads_control() && !self.read_control() {
            info!("FTP Server: control connection lost");
            self.session.task = Task::Disconnect;
        }

        match self.session.task {
            Task::Begin => self.begin(),
            Task::Connection => self.accept(),
            Task::UserIdentity | Task::Password => self.login(),
            Task::StartPasv => {
                pasv::start_pasv(&self.config, &mut self.session, &mut self.transport)
            }
            Task::StartPort => {
                port::start_port(&self.config, &mut self.session, &mut self.transport)
            }
            Task::DataConnection | Task::PortConnection => self.wait_data(),
            Task::SendFile | Task::RecvFile => self.transfer(),
            Task::ClosePort => {
                self.session.close_data(&mut self.transport);
                self.session.task = Task::Command;
            }
            Task::Command | Task::RecvRename => self.command(),
            Task::Disconnect => self.disconnect(),
            Task::DisconnectMain => {
                if self.session.linger > 0 {
                    self.session.linger -= 1;
                } else {
                    self.session.task = Task::Begin;
                }
            }
        }

        self.flush_replies();
    }

    fn context(&mut self) -> CommandContext<'_> {
        CommandContext {
            config: &self.config,
            session: &mut self.session,
            store: &mut self.store,
            transport: &mut self.transport,
        }
    }

    fn begin(&mut self) {
        let port = self.config.server.listen_port;
        let opened = self
            .transport
            .open(SocketOptions::control(self.config.server.line_capacity))
            .and_then(|handle| {
                self.session.ctrl = Some(handle);
                self.transport
                    .start(handle, Ipv4Addr::UNSPECIFIED, port, Role::Server)
            });
        match opened {
            Ok(()) => {
                debug!("FTP Server control listening on port {}", port);
                self.session.task = Task::Connection;
            }
            Err(e) => {
                error!("FTP Server: can't listen on port {}: {}", port, e);
                self.session.task = Task::Disconnect;
            }
        }
    }

    fn accept(&mut self) {
        let Some(ctrl) = self.session.ctrl else {
            self.session.task = Task::Begin;
            return;
        };
        if !self.transport.probe(ctrl) {
            self.session.task = Task::Disconnect;
            return;
        }
        if !self.transport.connected(ctrl) {
            return;
        }

        let ip = self
            .transport
            .local_ip(ctrl)
            .unwrap_or(Ipv4Addr::UNSPECIFIED);
        if let Some(peer) = self.transport.peer_ip(ctrl) {
            info!("FTP Server: connection from {}", peer);
        }
        let now = self.clock.now();
        self.session.replies.reply(
            220,
            format!(
                "{} FTP server {} {}",
                self.config.server.host_name,
                ip,
                now.format("%a %b %-d %H:%M:%S  %Y")
            ),
        );
        self.session.login_wait = self.config.timing.login_timeout_ticks;
        self.session.lines.clear();
        self.session.task = Task::UserIdentity;
    }

    /// Pulls whatever the control socket has into the line accumulator.
    ///
    /// Returns `false` once the control connection is gone.
    fn read_control(&mut self) -> bool {
        let Some(ctrl) = self.session.ctrl else {
            return false;
        };
        let want = self.session.lines.remaining().min(CONTROL_READ_CHUNK);
        if want > 0 {
            let mut buf = [0u8; CONTROL_READ_CHUNK];
            match self.transport.recv(ctrl, &mut buf[..want]) {
                Ok(0) => {}
                Ok(n) => {
                    if let Err(e) = self.session.lines.push(&buf[..n]) {
                        warn!("FTP Server: {}", e);
                        self.session.replies.line(&e.to_ftp_response());
                    }
                }
                Err(TransportError::Closed) => return false,
                Err(e) => {
                    warn!("FTP Server: control read failed: {}", e);
                    return false;
                }
            }
        }
        self.transport.connected(ctrl)
    }

    fn login(&mut self) {
        let Some(line) = self.session.lines.pop_line() else {
            if self.session.login_wait == 0 {
                warn!("FTP Server: login timeout");
                self.session.replies.reply(530, "Login timeout");
                self.session.task = Task::Disconnect;
            } else {
                self.session.login_wait -= 1;
            }
            return;
        };

        let command = Command::parse(&line);
        let kind = command.map(|c| c.kind);
        let arg = command.and_then(|c| c.non_empty_arg());
        let task = self.session.task;
        let mut ctx = self.context();

        let result: HandlerResult = match (task, kind) {
            (_, Some(FtpCommand::SYST)) => syst::handle_syst_command(&mut ctx),
            (_, Some(FtpCommand::QUIT)) => quit::handle_quit_command(&mut ctx),
            (Task::UserIdentity, Some(FtpCommand::USER)) => user::handle_user_command(&mut ctx, arg),
            (Task::UserIdentity, Some(FtpCommand::PASS)) => {
                warn!("FTP Server: PASS before USER");
                ctx.session.replies.reply(530, "Login with USER first");
                ctx.session.task = Task::Disconnect;
                Ok(())
            }
            (Task::UserIdentity, _) => {
                warn!("FTP Server: expected USER, got '{}'", line);
                ctx.session.replies.reply(500, "USER Certification Error");
                ctx.session.task = Task::Disconnect;
                Ok(())
            }
            (_, Some(FtpCommand::PASS)) => pass::handle_pass_command(&mut ctx, arg),
            (_, _) => {
                warn!("FTP Server: expected PASS, got '{}'", line);
                ctx.session.replies.reply(500, "PASS Certification Error");
                ctx.session.task = Task::Disconnect;
                Ok(())
            }
        };

        if let Err(e) = result {
            error!("FTP Server: login step failed: {}", e);
            ctx.session.replies.line(&e.to_ftp_response());
            ctx.session.task = Task::Disconnect;
        }
    }

    /// Keyword of the first complete buffered line, if it parses.
    fn head_command(&self) -> Option<FtpCommand> {
        self.session
            .lines
            .peek_line()
            .and_then(|line| Command::parse(line))
            .map(|c| c.kind)
    }

    /// An `ABOR` heads the buffered lines while data work is pending.
    fn abort_pending(&self) -> bool {
        self.session.task.is_abortable() && self.head_command() == Some(FtpCommand::ABOR)
    }

    fn abort(&mut self) {
        info!("FTP Server 'ABOR'");
        self.session.lines.pop_line();
        self.session.close_data(&mut self.transport);
        self.session.replies.reply(226, "Data connection closed");
        self.session.task = Task::Disconnect;
    }

    fn wait_data(&mut self) {
        if self.abort_pending() {
            return self.abort();
        }
        // A new PASV/PORT replaces the channel still being negotiated.
        if matches!(
            self.head_command(),
            Some(FtpCommand::PASV) | Some(FtpCommand::PORT)
        ) {
            if let Some(line) = self.session.lines.pop_line() {
                handlers::dispatch(&mut self.context(), &line);
            }
            return;
        }

        let Some(handle) = self.session.data.as_ref().and_then(|c| c.handle) else {
            self.session.close_data(&mut self.transport);
            self.session.task = Task::Command;
            return;
        };

        if self.transport.connected(handle) {
            if let Some(peer) = self.transport.peer_ip(handle) {
                debug!("FTP Server data connected: {}", peer);
            }
            self.session.task = Task::Command;
            return;
        }

        if let Some(channel) = self.session.data.as_mut() {
            if channel.countdown == 0 {
                warn!("FTP Server: data connection timeout");
                self.session.replies.reply(425, "No data connection (timeout)");
                self.session.close_data(&mut self.transport);
                self.session.task = Task::Command;
            } else {
                channel.countdown -= 1;
            }
        }
    }

    fn transfer(&mut self) {
        if self.abort_pending() {
            return self.abort();
        }

        let handle = self.session.data.as_ref().and_then(|c| c.handle);
        let (Some(handle), Some(job)) = (handle, self.session.transfer.as_mut()) else {
            warn!("FTP Server: transfer state without a job");
            self.session.close_data(&mut self.transport);
            self.session.task = Task::Command;
            return;
        };

        let step = job.step(
            &mut self.transport,
            handle,
            self.config.timing.transfer_timeout_ticks,
        );
        match step {
            Step::Progress => return,
            Step::Finished => match job.completion() {
                Completion::Matches { count, mlsd } => {
                    if mlsd {
                        self.session.replies.continued(226, "options: -a -l");
                    }
                    self.session
                        .replies
                        .reply(226, format!("{} matches total", count));
                }
                Completion::Throughput => {
                    let kbps = job.throughput_kbps(self.config.timing.tick_hz);
                    info!(
                        "FTP Server: transfer done, {} bytes in {} ticks",
                        job.total(),
                        job.ticks()
                    );
                    self.session.replies.reply(
                        226,
                        format!("File successfully transferred ({} KBytes/Sec)", kbps),
                    );
                }
            },
            Step::Stalled => {
                warn!("FTP Server: data timeout");
                self.session.replies.reply(421, "Data timeout. Reconnect. Sorry");
            }
            Step::Failed(e) => {
                error!("FTP Server: local I/O failed during transfer: {}", e);
                self.session
                    .replies
                    .reply(451, "Requested action aborted. Local error in processing.");
            }
            Step::Aborted(e) => {
                warn!("FTP Server: data connection broke: {}", e);
                self.session.replies.line(&e.to_ftp_response());
            }
        }
        self.session.close_data(&mut self.transport);
        self.session.task = Task::Command;
    }

    fn command(&mut self) {
        let Some(line) = self.session.lines.pop_line() else {
            return;
        };
        if self.session.task == Task::RecvRename
            && Command::parse(&line).map(|c| c.kind) != Some(FtpCommand::RNTO)
        {
            debug!("FTP Server: rename abandoned");
            self.session.rename_from = None;
            self.session.task = Task::Command;
        }
        handlers::dispatch(&mut self.context(), &line);
    }

    fn disconnect(&mut self) {
        self.session.close_data(&mut self.transport);
        if let Some(ctrl) = self.session.ctrl {
            if !self.session.replies.is_drained() {
                if let Err(e) = self.session.replies.flush_to(&mut self.transport, ctrl) {
                    debug!("FTP Server: final flush failed: {}", e);
                }
            }
            self.transport.close(ctrl);
            info!("FTP Server: session closed");
        }
        self.session.reset();
        self.session.linger = self.config.timing.disconnect_linger_ticks;
        self.session.task = Task::DisconnectMain;
    }

    fn flush_replies(&mut self) {
        if self.session.replies.is_drained() {
            return;
        }
        let Some(ctrl) = self.session.ctrl else {
            self.session.replies.clear();
            return;
        };
        if let Err(e) = self.session.replies.flush_to(&mut self.transport, ctrl) {
            warn!("FTP Server: reply send failed: {}", e);
            self.session.replies.clear();
            if self.session.task.reads_control() {
                self.session.task = Task::Disconnect;
            }
        }
    }
}
