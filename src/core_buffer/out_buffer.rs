use crate::core_network::error::TransportError;
use crate::core_network::transport::{SocketHandle, Transport};
use std::fmt;

/// Outgoing byte buffer shared by the FTP reply formatter and the HTTP
/// response writer.
///
/// Offsets returned by [`OutBuffer::len`] are absolute from the last
/// [`OutBuffer::clear`], which lets the HTTP engine patch a header field
/// after the body has been rendered.
#[derive(Debug, Default, Clone)]
pub struct OutBuffer {
    data: Vec<u8>,
    sent: usize,
}

impl OutBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.sent = 0;
    }

    /// Total bytes written since the last clear.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when everything written has been handed to the transport.
    pub fn is_drained(&self) -> bool {
        self.sent >= self.data.len()
    }

    pub fn pending(&self) -> &[u8] {
        &self.data[self.sent..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn push_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Overwrites `bytes.len()` bytes at `offset`.
    pub fn patch(&mut self, offset: usize, bytes: &[u8]) {
        let end = offset + bytes.len();
        if end <= self.data.len() {
            self.data[offset..end].copy_from_slice(bytes);
        }
    }

    /// Replaces `len` bytes at `offset` with `bytes`, which may differ in size.
    pub fn splice(&mut self, offset: usize, len: usize, bytes: &[u8]) {
        let end = (offset + len).min(self.data.len());
        self.data.splice(offset..end, bytes.iter().copied());
    }

    /// Hands as much pending output as the transport accepts.
    pub fn flush_to(
        &mut self,
        transport: &mut dyn Transport,
        handle: SocketHandle,
    ) -> Result<usize, TransportError> {
        if self.is_drained() {
            return Ok(0);
        }
        let n = transport.send(handle, self.pending())?;
        self.sent += n;
        if self.is_drained() {
            self.clear();
        }
        Ok(n)
    }
}

impl fmt::Write for OutBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn test_patch_in_place() {
        let mut out = OutBuffer::new();
        out.push_str("Content-Length: ");
        let at = out.len();
        out.push_str("     \n");
        out.patch(at, b"   42");
        assert_eq!(out.as_bytes(), b"Content-Length:    42\n");
    }

    #[test]
    fn test_splice_widens_field() {
        let mut out = OutBuffer::new();
        write!(out, "len:[     ]").unwrap();
        out.splice(5, 5, b"123456");
        assert_eq!(out.as_bytes(), b"len:[123456]");
    }
}
