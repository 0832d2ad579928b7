use crate::core_network::error::TransportError;
use std::net::Ipv4Addr;

/// Index of a socket slot owned by a [`Transport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketHandle(pub usize);

/// Which side opens the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Listen on the given address/port and accept exactly one peer.
    Server,
    /// Connect out to the given address/port.
    Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketOptions {
    pub send_capacity: usize,
    pub recv_capacity: usize,
    /// Emit `\r\n` on the wire for every `\n` handed to `send`.
    pub line_mode: bool,
}

impl SocketOptions {
    pub fn control(capacity: usize) -> Self {
        Self {
            send_capacity: capacity,
            recv_capacity: capacity,
            line_mode: true,
        }
    }

    pub fn data(capacity: usize) -> Self {
        Self {
            send_capacity: capacity,
            recv_capacity: capacity,
            line_mode: false,
        }
    }
}

/// Non-blocking byte-stream transport consumed by both engines.
///
/// No method may block. Connection establishment is started by `start` and
/// observed by polling `connected` once per tick.
pub trait Transport {
    /// Housekeeping run once per tick before the engine's own work.
    fn service(&mut self) {}

    fn open(&mut self, options: SocketOptions) -> Result<SocketHandle, TransportError>;

    fn start(
        &mut self,
        handle: SocketHandle,
        addr: Ipv4Addr,
        port: u16,
        role: Role,
    ) -> Result<(), TransportError>;

    fn connected(&mut self, handle: SocketHandle) -> bool;

    /// Whether the handle still refers to a usable (pending or live) socket.
    fn probe(&self, handle: SocketHandle) -> bool;

    /// `Ok(0)` when nothing is available yet, `Err(TransportError::Closed)`
    /// once the peer has gone away.
    fn recv(&mut self, handle: SocketHandle, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Returns how many bytes of `buf` were accepted.
    fn send(&mut self, handle: SocketHandle, buf: &[u8]) -> Result<usize, TransportError>;

    fn close(&mut self, handle: SocketHandle);

    fn peer_ip(&self, handle: SocketHandle) -> Option<Ipv4Addr>;

    fn local_ip(&self, handle: SocketHandle) -> Option<Ipv4Addr>;

    fn local_port(&self, handle: SocketHandle) -> Option<u16>;
}
