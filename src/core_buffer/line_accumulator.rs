use crate::core_buffer::error::LineError;
use log::warn;

const LINE_TERM: u8 = b'\n';

/// Bounded byte buffer turning a raw byte stream into `\n`-terminated lines.
///
/// Bytes are stored as received (minus `\r` and NUL) and lines are located
/// lazily when popped, so a half-received line simply stays in the buffer
/// until its terminator arrives. The whole buffer is bounded by `capacity`:
/// callers should never push more than [`LineAccumulator::remaining`] bytes
/// at once. A single line that fills the buffer without a terminator is an
/// overflow; the partial line is dropped, the bytes up to the next terminator
/// are skipped and [`LineError::Overflow`] is reported.
#[derive(Debug, Clone)]
pub struct LineAccumulator {
    buf: Vec<u8>,
    capacity: usize,
    discarding: bool,
}

impl LineAccumulator {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
            discarding: false,
        }
    }

    /// Free space left in the buffer.
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.buf.len())
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }

    /// Appends received bytes.
    ///
    /// Bytes that do not fit are dropped; the return value is the number of
    /// input bytes consumed.
    pub fn push(&mut self, bytes: &[u8]) -> Result<usize, LineError> {
        let mut overflow = false;
        let mut consumed = 0;

        for &ch in bytes {
            if ch == 0 || ch == b'\r' {
                consumed += 1;
                continue;
            }
            if self.discarding {
                consumed += 1;
                if ch == LINE_TERM {
                    self.discarding = false;
                }
                continue;
            }
            if self.buf.len() >= self.capacity {
                break;
            }
            self.buf.push(ch);
            consumed += 1;

            if self.buf.len() >= self.capacity && !self.buf.contains(&LINE_TERM) {
                warn!(
                    "line accumulator overflow ({} bytes), dropping partial line",
                    self.capacity
                );
                self.buf.clear();
                self.discarding = true;
                overflow = true;
            }
        }

        if overflow {
            Err(LineError::Overflow {
                capacity: self.capacity,
            })
        } else {
            Ok(consumed)
        }
    }

    /// The first complete line, without consuming it.
    pub fn peek_line(&self) -> Option<&str> {
        let end = self.buf.iter().position(|&c| c == LINE_TERM)?;
        std::str::from_utf8(&self.buf[..end]).ok()
    }

    /// Removes and returns the first complete line (terminator stripped).
    ///
    /// Invalid UTF-8 is replaced lossily so a garbled command still produces
    /// an "unknown command" reply instead of stalling the buffer.
    pub fn pop_line(&mut self) -> Option<String> {
        let end = self.buf.iter().position(|&c| c == LINE_TERM)?;
        let line = String::from_utf8_lossy(&self.buf[..end]).into_owned();
        self.buf.drain(..=end);
        Some(line)
    }
}
