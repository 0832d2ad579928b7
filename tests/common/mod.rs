#![allow(dead_code)]

use chrono::{Local, TimeZone};
use std::collections::VecDeque;
use std::io;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tickftpd::clock::FixedClock;
use tickftpd::core_fs::LocalStore;
use tickftpd::core_network::{
    FtpServer, Role, SocketHandle, SocketOptions, Transport, TransportError,
};
use tickftpd::session::Task;
use tickftpd::Config;

pub const LOCAL_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);
pub const PEER_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

#[derive(Debug)]
pub struct MockSocket {
    pub options: SocketOptions,
    pub addr: Option<Ipv4Addr>,
    pub port: u16,
    pub role: Option<Role>,
    pub connected: bool,
    pub closed: bool,
    pub peer_closed: bool,
    pub inbound: VecDeque<u8>,
    pub outbound: Vec<u8>,
    pub send_limit: Option<usize>,
}

/// In-memory transport; the test plays the remote peer.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub sockets: Vec<MockSocket>,
    pub fail_open: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn socket(&self, handle: SocketHandle) -> &MockSocket {
        &self.sockets[handle.0]
    }

    fn socket_mut(&mut self, handle: SocketHandle) -> &mut MockSocket {
        &mut self.sockets[handle.0]
    }

    /// Most recent open socket started on `port`.
    pub fn handle_for_port(&self, port: u16) -> Option<SocketHandle> {
        self.sockets
            .iter()
            .enumerate()
            .rev()
            .find(|(_, s)| s.port == port && s.role.is_some() && !s.closed)
            .map(|(i, _)| SocketHandle(i))
    }

    pub fn connect(&mut self, handle: SocketHandle) {
        self.socket_mut(handle).connected = true;
    }

    pub fn feed(&mut self, handle: SocketHandle, bytes: &[u8]) {
        self.socket_mut(handle).inbound.extend(bytes.iter().copied());
    }

    pub fn peer_close(&mut self, handle: SocketHandle) {
        self.socket_mut(handle).peer_closed = true;
    }

    pub fn take_output(&mut self, handle: SocketHandle) -> String {
        String::from_utf8_lossy(&self.take_bytes(handle)).into_owned()
    }

    pub fn take_bytes(&mut self, handle: SocketHandle) -> Vec<u8> {
        std::mem::take(&mut self.socket_mut(handle).outbound)
    }

    pub fn set_send_limit(&mut self, handle: SocketHandle, limit: Option<usize>) {
        self.socket_mut(handle).send_limit = limit;
    }

    pub fn is_closed(&self, handle: SocketHandle) -> bool {
        self.socket(handle).closed
    }

    pub fn open_sockets(&self) -> usize {
        self.sockets.iter().filter(|s| !s.closed).count()
    }

    pub fn info(&self, handle: SocketHandle) -> &MockSocket {
        self.socket(handle)
    }
}

impl Transport for MockTransport {
    fn open(&mut self, options: SocketOptions) -> Result<SocketHandle, TransportError> {
        if self.fail_open {
            return Err(TransportError::Io(io::Error::new(
                io::ErrorKind::Other,
                "open refused",
            )));
        }
        self.sockets.push(MockSocket {
            options,
            addr: None,
            port: 0,
            role: None,
            connected: false,
            closed: false,
            peer_closed: false,
            inbound: VecDeque::new(),
            outbound: Vec::new(),
            send_limit: None,
        });
        Ok(SocketHandle(self.sockets.len() - 1))
    }

    fn start(
        &mut self,
        handle: SocketHandle,
        addr: Ipv4Addr,
        port: u16,
        role: Role,
    ) -> Result<(), TransportError> {
        let socket = self
            .sockets
            .get_mut(handle.0)
            .ok_or(TransportError::NoSuchSocket(handle))?;
        socket.addr = Some(addr);
        socket.port = port;
        socket.role = Some(role);
        Ok(())
    }

    fn connected(&mut self, handle: SocketHandle) -> bool {
        let s = self.socket(handle);
        s.connected && !s.closed && !(s.peer_closed && s.inbound.is_empty())
    }

    fn probe(&self, handle: SocketHandle) -> bool {
        self.sockets.get(handle.0).map_or(false, |s| !s.closed)
    }

    fn recv(&mut self, handle: SocketHandle, buf: &mut [u8]) -> Result<usize, TransportError> {
        let s = self.socket_mut(handle);
        if s.closed {
            return Err(TransportError::NoSuchSocket(handle));
        }
        if s.inbound.is_empty() {
            return if s.peer_closed {
                Err(TransportError::Closed)
            } else {
                Ok(0)
            };
        }
        let n = buf.len().min(s.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(s.inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn send(&mut self, handle: SocketHandle, buf: &[u8]) -> Result<usize, TransportError> {
        let s = self.socket_mut(handle);
        if s.closed {
            return Err(TransportError::NoSuchSocket(handle));
        }
        if s.peer_closed {
            return Err(TransportError::Closed);
        }
        if !s.connected {
            return Err(TransportError::NotConnected(handle));
        }
        let n = buf.len().min(s.send_limit.unwrap_or(usize::MAX));
        s.outbound.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn close(&mut self, handle: SocketHandle) {
        if let Some(s) = self.sockets.get_mut(handle.0) {
            s.closed = true;
        }
    }

    fn peer_ip(&self, handle: SocketHandle) -> Option<Ipv4Addr> {
        self.sockets
            .get(handle.0)
            .filter(|s| s.connected)
            .map(|_| PEER_IP)
    }

    fn local_ip(&self, handle: SocketHandle) -> Option<Ipv4Addr> {
        self.sockets.get(handle.0).map(|_| LOCAL_IP)
    }

    fn local_port(&self, handle: SocketHandle) -> Option<u16> {
        self.sockets.get(handle.0).map(|s| s.port)
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.server.listen_port = 2121;
    config.server.pasv_port = 55600;
    config.server.host_name = "testhost".to_string();
    config.server.system_name = "UNIX".to_string();
    config.server.username = "bob".to_string();
    config.server.password = "secret".to_string();
    config
}

pub fn test_clock() -> FixedClock {
    FixedClock(Local.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap())
}

pub type TestFtpServer = FtpServer<MockTransport, LocalStore, FixedClock>;

/// An FTP engine with a client already connected to its control port.
pub struct FtpFixture {
    pub server: TestFtpServer,
    pub dir: TempDir,
    pub ctrl: SocketHandle,
}

impl FtpFixture {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();
        let mut server = FtpServer::new(Arc::new(config), MockTransport::new(), store, test_clock());

        server.service();
        assert_eq!(server.task(), Task::Connection);
        let ctrl = SocketHandle(0);
        server.transport_mut().connect(ctrl);
        server.service();
        assert_eq!(server.task(), Task::UserIdentity);

        Self { server, dir, ctrl }
    }

    pub fn tick(&mut self) {
        self.server.service();
    }

    pub fn ticks(&mut self, n: usize) {
        for _ in 0..n {
            self.server.service();
        }
    }

    pub fn task(&self) -> Task {
        self.server.task()
    }

    pub fn transport(&mut self) -> &mut MockTransport {
        self.server.transport_mut()
    }

    /// Queues a control line as the client would send it.
    pub fn send(&mut self, line: &str) {
        let ctrl = self.ctrl;
        let wire = format!("{}\r\n", line);
        self.transport().feed(ctrl, wire.as_bytes());
    }

    pub fn replies(&mut self) -> String {
        let ctrl = self.ctrl;
        self.transport().take_output(ctrl)
    }

    /// Sends one line, runs one tick and returns what was replied.
    pub fn command(&mut self, line: &str) -> String {
        self.send(line);
        self.tick();
        self.replies()
    }

    pub fn login(&mut self) {
        self.replies();
        assert!(self.command("USER bob").starts_with("331 "));
        assert!(self.command("PASS secret").starts_with("230 "));
        assert_eq!(self.task(), Task::Command);
    }

    /// PASV, client connect, back in `Command`; returns the data handle.
    pub fn open_pasv(&mut self) -> SocketHandle {
        self.send("PASV");
        self.tick();
        assert_eq!(self.task(), Task::StartPasv);
        self.tick();
        let reply = self.replies();
        assert!(reply.starts_with("227 Entering Passive Mode ("), "{}", reply);
        assert_eq!(self.task(), Task::DataConnection);

        let port = self.server.session().data.as_ref().unwrap().port;
        let data = self.transport().handle_for_port(port).unwrap();
        self.transport().connect(data);
        self.tick();
        assert_eq!(self.task(), Task::Command);
        data
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}
