use crate::core_network::transport::{SocketHandle, Transport};
use std::net::Ipv4Addr;

/// The per-session data connection, pending or connected.
///
/// Never reused across transfers: it is closed at the end of every transfer
/// and whenever a new PASV/PORT replaces it.
#[derive(Debug, Clone)]
pub struct DataChannel {
    /// Listen address (passive) or client address (active).
    pub addr: Ipv4Addr,
    pub port: u16,
    /// Ticks left before the connection wait gives up.
    pub countdown: u32,
    pub handle: Option<SocketHandle>,
}

/// Result of checking the channel before a transfer command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataState {
    Missing,
    /// A channel exists but its socket is not connected.
    Unusable,
    Ready(SocketHandle),
}

impl DataChannel {
    /// PASV: we listen, the client connects.
    pub fn passive(port: u16) -> Self {
        Self {
            addr: Ipv4Addr::UNSPECIFIED,
            port,
            countdown: 0,
            handle: None,
        }
    }

    /// PORT: the client listens, we connect.
    pub fn active(addr: Ipv4Addr, port: u16) -> Self {
        Self {
            addr,
            port,
            countdown: 0,
            handle: None,
        }
    }

    pub fn state(channel: Option<&DataChannel>, transport: &mut dyn Transport) -> DataState {
        match channel.and_then(|c| c.handle) {
            None if channel.is_none() => DataState::Missing,
            Some(handle) if transport.connected(handle) => DataState::Ready(handle),
            _ => DataState::Unusable,
        }
    }

    pub fn close(self, transport: &mut dyn Transport) {
        if let Some(handle) = self.handle {
            transport.close(handle);
        }
    }
}
