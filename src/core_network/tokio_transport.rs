use crate::core_network::error::TransportError;
use crate::core_network::transport::{Role, SocketHandle, SocketOptions, Transport};
use log::{debug, error, trace, warn};
use std::io::{self, ErrorKind};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::{TcpSocket, TcpStream};
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;

type Establish = io::Result<(TcpStream, SocketAddr)>;

enum SlotState {
    Opened,
    Pending {
        rx: oneshot::Receiver<Establish>,
        task: JoinHandle<()>,
        local: Option<SocketAddr>,
    },
    Connected {
        stream: TcpStream,
        peer: SocketAddr,
        local: SocketAddr,
        eof: bool,
    },
    Failed,
}

struct Slot {
    options: SocketOptions,
    state: SlotState,
    wire: Vec<u8>,
}

/// [`Transport`] over tokio TCP sockets.
///
/// Accepts and connects run as small spawned tasks whose result is picked
/// up with `try_recv` on the next tick; reads and writes use the
/// non-blocking `try_read`/`try_write`. Must be used from inside a tokio
/// runtime.
#[derive(Default)]
pub struct TokioTransport {
    slots: Vec<Option<Slot>>,
    lingering: Vec<(TcpStream, Vec<u8>)>,
}

impl TokioTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, handle: SocketHandle) -> Option<&Slot> {
        self.slots.get(handle.0).and_then(|s| s.as_ref())
    }

    fn slot_mut(&mut self, handle: SocketHandle) -> Result<&mut Slot, TransportError> {
        self.slots
            .get_mut(handle.0)
            .and_then(|s| s.as_mut())
            .ok_or(TransportError::NoSuchSocket(handle))
    }

    fn listen(addr: SocketAddr) -> io::Result<(tokio::net::TcpListener, SocketAddr)> {
        let socket = TcpSocket::new_v4()?;
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(1)?;
        let local = listener.local_addr()?;
        Ok((listener, local))
    }
}

fn v4(addr: &SocketAddr) -> Option<Ipv4Addr> {
    match addr.ip() {
        IpAddr::V4(ip) => Some(ip),
        IpAddr::V6(ip) => ip.to_ipv4_mapped(),
    }
}

/// Writes as much of `wire` as the socket takes right now.
fn flush_wire(stream: &TcpStream, wire: &mut Vec<u8>) -> io::Result<()> {
    while !wire.is_empty() {
        match stream.try_write(wire) {
            Ok(0) => return Err(ErrorKind::WriteZero.into()),
            Ok(n) => {
                wire.drain(..n);
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(()),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

impl Transport for TokioTransport {
    fn service(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            if let SlotState::Connected { stream, .. } = &slot.state {
                if let Err(e) = flush_wire(stream, &mut slot.wire) {
                    warn!("socket write failed: {}", e);
                    slot.wire.clear();
                    slot.state = SlotState::Failed;
                }
            }
        }
        self.lingering
            .retain_mut(|(stream, wire)| flush_wire(stream, wire).is_ok() && !wire.is_empty());
    }

    fn open(&mut self, options: SocketOptions) -> Result<SocketHandle, TransportError> {
        let slot = Slot {
            options,
            state: SlotState::Opened,
            wire: Vec::with_capacity(options.send_capacity),
        };
        let index = match self.slots.iter().position(|s| s.is_none()) {
            Some(index) => {
                self.slots[index] = Some(slot);
                index
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };
        trace!("socket opened: desc({})", index);
        Ok(SocketHandle(index))
    }

    fn start(
        &mut self,
        handle: SocketHandle,
        addr: Ipv4Addr,
        port: u16,
        role: Role,
    ) -> Result<(), TransportError> {
        let target = SocketAddr::from((addr, port));
        let (tx, rx) = oneshot::channel::<Establish>();

        let (task, local) = match role {
            Role::Server => {
                let (listener, local) = Self::listen(target)?;
                debug!("listening on {} desc({})", local, handle.0);
                let task = tokio::spawn(async move {
                    let _ = tx.send(listener.accept().await);
                });
                (task, Some(local))
            }
            Role::Client => {
                debug!("connecting to {} desc({})", target, handle.0);
                let task = tokio::spawn(async move {
                    let result = TcpStream::connect(target).await.and_then(|stream| {
                        let peer = stream.peer_addr()?;
                        Ok((stream, peer))
                    });
                    let _ = tx.send(result);
                });
                (task, None)
            }
        };

        let slot = self.slot_mut(handle)?;
        slot.state = SlotState::Pending { rx, task, local };
        Ok(())
    }

    fn connected(&mut self, handle: SocketHandle) -> bool {
        let Ok(slot) = self.slot_mut(handle) else {
            return false;
        };
        match &mut slot.state {
            SlotState::Connected { eof, .. } => !*eof,
            SlotState::Pending { rx, .. } => match rx.try_recv() {
                Ok(Ok((stream, peer))) => {
                    let local = stream.local_addr().unwrap_or(peer);
                    if let Err(e) = stream.set_nodelay(true) {
                        trace!("set_nodelay failed: {}", e);
                    }
                    debug!("connected {} <-> {} desc({})", local, peer, handle.0);
                    slot.state = SlotState::Connected {
                        stream,
                        peer,
                        local,
                        eof: false,
                    };
                    true
                }
                Ok(Err(e)) => {
                    error!("connection failed desc({}): {}", handle.0, e);
                    slot.state = SlotState::Failed;
                    false
                }
                Err(TryRecvError::Empty) => false,
                Err(TryRecvError::Closed) => {
                    slot.state = SlotState::Failed;
                    false
                }
            },
            SlotState::Opened | SlotState::Failed => false,
        }
    }

    fn probe(&self, handle: SocketHandle) -> bool {
        matches!(
            self.slot(handle).map(|s| &s.state),
            Some(SlotState::Opened | SlotState::Pending { .. } | SlotState::Connected { .. })
        )
    }

    fn recv(&mut self, handle: SocketHandle, buf: &mut [u8]) -> Result<usize, TransportError> {
        let slot = self.slot_mut(handle)?;
        let limit = buf.len().min(slot.options.recv_capacity.max(1));
        match &mut slot.state {
            SlotState::Connected { stream, eof, .. } => {
                if *eof {
                    return Err(TransportError::Closed);
                }
                match stream.try_read(&mut buf[..limit]) {
                    Ok(0) => {
                        *eof = true;
                        Err(TransportError::Closed)
                    }
                    Ok(n) => Ok(n),
                    Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
                    Err(e) => {
                        slot.state = SlotState::Failed;
                        Err(e.into())
                    }
                }
            }
            SlotState::Pending { .. } | SlotState::Opened => Ok(0),
            SlotState::Failed => Err(TransportError::Closed),
        }
    }

    fn send(&mut self, handle: SocketHandle, buf: &[u8]) -> Result<usize, TransportError> {
        let slot = self.slot_mut(handle)?;
        let SlotState::Connected { stream, .. } = &slot.state else {
            return Err(TransportError::NotConnected(handle));
        };

        let room = slot.options.send_capacity.saturating_sub(slot.wire.len());
        let mut accepted = 0;
        let mut used = 0;
        for &b in buf {
            let width = if slot.options.line_mode && b == b'\n' { 2 } else { 1 };
            if used + width > room {
                break;
            }
            if width == 2 {
                slot.wire.push(b'\r');
            }
            slot.wire.push(b);
            used += width;
            accepted += 1;
        }

        if let Err(e) = flush_wire(stream, &mut slot.wire) {
            slot.wire.clear();
            slot.state = SlotState::Failed;
            return Err(e.into());
        }
        Ok(accepted)
    }

    fn close(&mut self, handle: SocketHandle) {
        let Some(slot) = self.slots.get_mut(handle.0).and_then(|s| s.take()) else {
            return;
        };
        match slot.state {
            SlotState::Connected { stream, .. } => {
                let mut wire = slot.wire;
                if flush_wire(&stream, &mut wire).is_ok() && !wire.is_empty() {
                    self.lingering.push((stream, wire));
                }
            }
            SlotState::Pending { task, .. } => task.abort(),
            SlotState::Opened | SlotState::Failed => {}
        }
        trace!("socket closed: desc({})", handle.0);
    }

    fn peer_ip(&self, handle: SocketHandle) -> Option<Ipv4Addr> {
        match &self.slot(handle)?.state {
            SlotState::Connected { peer, .. } => v4(peer),
            _ => None,
        }
    }

    fn local_ip(&self, handle: SocketHandle) -> Option<Ipv4Addr> {
        match &self.slot(handle)?.state {
            SlotState::Connected { local, .. } => v4(local),
            SlotState::Pending {
                local: Some(local), ..
            } => v4(local),
            _ => None,
        }
    }

    fn local_port(&self, handle: SocketHandle) -> Option<u16> {
        match &self.slot(handle)?.state {
            SlotState::Connected { local, .. } => Some(local.port()),
            SlotState::Pending {
                local: Some(local), ..
            } => Some(local.port()),
            _ => None,
        }
    }
}
