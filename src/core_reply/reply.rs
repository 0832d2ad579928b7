use crate::core_buffer::OutBuffer;
use crate::core_network::error::TransportError;
use crate::core_network::transport::{SocketHandle, Transport};
use log::debug;
use std::fmt::Display;

/// Outgoing control-channel replies, `\n`-terminated.
///
/// Replies accumulate here during a tick and are handed to the transport
/// once at the end of it; whatever the transport refuses stays queued.
#[derive(Debug, Default)]
pub struct ReplyBuffer {
    out: OutBuffer,
}

impl ReplyBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<code> <text>`
    pub fn reply(&mut self, code: u16, text: impl Display) {
        let line = format!("{} {}", code, text);
        self.line(&line);
    }

    /// `<code>-<text>`, a non-final line of a multi-line reply.
    pub fn continued(&mut self, code: u16, text: impl Display) {
        let line = format!("{}-{}", code, text);
        self.line(&line);
    }

    /// Queues a preformatted line.
    pub fn line(&mut self, line: &str) {
        debug!("FTP reply: {}", line);
        self.out.push_str(line);
        self.out.push_bytes(b"\n");
    }

    pub fn is_drained(&self) -> bool {
        self.out.is_drained()
    }

    pub fn pending(&self) -> &[u8] {
        self.out.pending()
    }

    pub fn clear(&mut self) {
        self.out.clear();
    }

    pub fn flush_to(
        &mut self,
        transport: &mut dyn Transport,
        handle: SocketHandle,
    ) -> Result<usize, TransportError> {
        self.out.flush_to(transport, handle)
    }
}
