use crate::core_network::error::TransportError;
use crate::core_network::transport::{SocketHandle, Transport};
use log::{debug, error, trace};
use std::io::{self, Cursor, ErrorKind, Read, Write};

/// What the final `226` reply reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// `226 File successfully transferred (<k> KBytes/Sec)`
    Throughput,
    /// `226 <count> matches total`, preceded by the MLSD options line.
    Matches { count: usize, mlsd: bool },
}

enum Endpoint {
    /// Server to client: file contents or a rendered listing.
    Source(Box<dyn Read + Send>),
    /// Client to server.
    Sink(Box<dyn Write + Send>),
}

/// Outcome of one [`TransferJob::step`].
#[derive(Debug)]
pub enum Step {
    Progress,
    Finished,
    /// The stall counter reached the limit.
    Stalled,
    /// Local read/write failure.
    Failed(io::Error),
    /// The data connection broke.
    Aborted(TransportError),
}

/// One streamed transfer over a connected data channel.
///
/// Each [`step`](TransferJob::step) moves at most one chunk, so a transfer
/// never holds the engine for longer than a single tick.
pub struct TransferJob {
    endpoint: Endpoint,
    completion: Completion,
    chunk: Vec<u8>,
    pending: usize,
    offset: usize,
    eof: bool,
    total: u64,
    ticks: u32,
    stall: u32,
}

impl TransferJob {
    pub fn download(source: Box<dyn Read + Send>, chunk_size: usize) -> Self {
        Self::new(Endpoint::Source(source), Completion::Throughput, chunk_size)
    }

    pub fn upload(sink: Box<dyn Write + Send>, chunk_size: usize) -> Self {
        Self::new(Endpoint::Sink(sink), Completion::Throughput, chunk_size)
    }

    /// Streams an already rendered listing of `count` entries.
    pub fn listing(body: String, count: usize, mlsd: bool, chunk_size: usize) -> Self {
        Self::new(
            Endpoint::Source(Box::new(Cursor::new(body.into_bytes()))),
            Completion::Matches { count, mlsd },
            chunk_size,
        )
    }

    fn new(endpoint: Endpoint, completion: Completion, chunk_size: usize) -> Self {
        Self {
            endpoint,
            completion,
            chunk: vec![0; chunk_size.max(1)],
            pending: 0,
            offset: 0,
            eof: false,
            total: 0,
            ticks: 0,
            stall: 0,
        }
    }

    pub fn completion(&self) -> Completion {
        self.completion
    }

    pub fn is_upload(&self) -> bool {
        matches!(self.endpoint, Endpoint::Sink(_))
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn stall(&self) -> u32 {
        self.stall
    }

    pub fn throughput_kbps(&self, tick_hz: u32) -> u64 {
        throughput_kbps(self.total, self.ticks, tick_hz)
    }

    /// Moves at most one chunk between the endpoint and the data socket.
    pub fn step(
        &mut self,
        transport: &mut dyn Transport,
        handle: SocketHandle,
        stall_limit: u32,
    ) -> Step {
        self.ticks = self.ticks.saturating_add(1);
        let moved = if self.is_upload() {
            match self.recv_chunk(transport, handle) {
                Ok(Some(n)) => n,
                Ok(None) => return self.finish_upload(),
                Err(step) => return step,
            }
        } else {
            match self.send_chunk(transport, handle) {
                Ok(n) => n,
                Err(step) => return step,
            }
        };

        if moved > 0 {
            self.total += moved as u64;
            self.stall = 0;
        } else {
            self.stall = self.stall.saturating_add(1);
        }

        if self.eof && self.offset >= self.pending {
            debug!(
                "Data send {} Bytes in {} ticks",
                self.total, self.ticks
            );
            return Step::Finished;
        }
        if self.stall >= stall_limit {
            debug!("Data transfer stalled after {} idle ticks", self.stall);
            return Step::Stalled;
        }
        Step::Progress
    }

    fn send_chunk(
        &mut self,
        transport: &mut dyn Transport,
        handle: SocketHandle,
    ) -> Result<usize, Step> {
        let Endpoint::Source(source) = &mut self.endpoint else {
            return Ok(0);
        };
        if self.offset >= self.pending && !self.eof {
            let filled = fill(source.as_mut(), &mut self.chunk).map_err(|e| {
                error!("Local read failed: {}", e);
                Step::Failed(e)
            })?;
            // A short read marks the end of the data.
            self.eof = filled < self.chunk.len();
            self.pending = filled;
            self.offset = 0;
            trace!("read {} bytes, eof={}", filled, self.eof);
        }
        if self.offset >= self.pending {
            return Ok(0);
        }
        match transport.send(handle, &self.chunk[self.offset..self.pending]) {
            Ok(n) => {
                self.offset += n;
                Ok(n)
            }
            Err(e) => {
                error!("Data send failed: {}", e);
                Err(Step::Aborted(e))
            }
        }
    }

    /// `Ok(None)` once the peer has closed the data connection.
    fn recv_chunk(
        &mut self,
        transport: &mut dyn Transport,
        handle: SocketHandle,
    ) -> Result<Option<usize>, Step> {
        let Endpoint::Sink(sink) = &mut self.endpoint else {
            return Ok(Some(0));
        };
        match transport.recv(handle, &mut self.chunk) {
            Ok(0) => {
                if transport.connected(handle) {
                    Ok(Some(0))
                } else {
                    Ok(None)
                }
            }
            Ok(n) => {
                sink.write_all(&self.chunk[..n]).map_err(|e| {
                    error!("Local write failed: {}", e);
                    Step::Failed(e)
                })?;
                Ok(Some(n))
            }
            Err(TransportError::Closed) => Ok(None),
            Err(e) => {
                error!("Data recv failed: {}", e);
                Err(Step::Aborted(e))
            }
        }
    }

    fn finish_upload(&mut self) -> Step {
        if let Endpoint::Sink(sink) = &mut self.endpoint {
            if let Err(e) = sink.flush() {
                error!("Local flush failed: {}", e);
                return Step::Failed(e);
            }
        }
        debug!("Data recv {} Bytes in {} ticks", self.total, self.ticks);
        Step::Finished
    }
}

/// Reads until `buf` is full or the source is exhausted.
fn fill(source: &mut dyn Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// `total * tick_hz / ticks / 1024`, in KB/s.
pub fn throughput_kbps(total: u64, ticks: u32, tick_hz: u32) -> u64 {
    total.saturating_mul(u64::from(tick_hz)) / u64::from(ticks.max(1)) / 1024
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_network::transport::{Role, SocketOptions};
    use std::net::Ipv4Addr;

    /// Data socket that accepts up to `accept` bytes per send.
    struct Sink {
        accept: usize,
        sent: Vec<u8>,
    }

    impl Transport for Sink {
        fn open(&mut self, _: SocketOptions) -> Result<SocketHandle, TransportError> {
            Ok(SocketHandle(0))
        }
        fn start(&mut self, _: SocketHandle, _: Ipv4Addr, _: u16, _: Role) -> Result<(), TransportError> {
            Ok(())
        }
        fn connected(&mut self, _: SocketHandle) -> bool {
            true
        }
        fn probe(&self, _: SocketHandle) -> bool {
            true
        }
        fn recv(&mut self, _: SocketHandle, _: &mut [u8]) -> Result<usize, TransportError> {
            Ok(0)
        }
        fn send(&mut self, _: SocketHandle, buf: &[u8]) -> Result<usize, TransportError> {
            let n = buf.len().min(self.accept);
            self.sent.extend_from_slice(&buf[..n]);
            Ok(n)
        }
        fn close(&mut self, _: SocketHandle) {}
        fn peer_ip(&self, _: SocketHandle) -> Option<Ipv4Addr> {
            None
        }
        fn local_ip(&self, _: SocketHandle) -> Option<Ipv4Addr> {
            None
        }
        fn local_port(&self, _: SocketHandle) -> Option<u16> {
            None
        }
    }

    #[test]
    fn test_download_moves_one_chunk_per_step() {
        let data: Vec<u8> = (0..250u32).map(|i| i as u8).collect();
        let mut job = TransferJob::download(Box::new(Cursor::new(data.clone())), 100);
        let mut sink = Sink { accept: usize::MAX, sent: Vec::new() };

        assert!(matches!(job.step(&mut sink, SocketHandle(0), 10), Step::Progress));
        assert_eq!(sink.sent.len(), 100);
        assert!(matches!(job.step(&mut sink, SocketHandle(0), 10), Step::Progress));
        assert!(matches!(job.step(&mut sink, SocketHandle(0), 10), Step::Finished));
        assert_eq!(sink.sent, data);
        assert_eq!(job.total(), 250);
        assert_eq!(job.ticks(), 3);
    }

    #[test]
    fn test_exact_multiple_needs_an_empty_read() {
        let mut job = TransferJob::download(Box::new(Cursor::new(vec![7u8; 200])), 100);
        let mut sink = Sink { accept: usize::MAX, sent: Vec::new() };
        assert!(matches!(job.step(&mut sink, SocketHandle(0), 10), Step::Progress));
        assert!(matches!(job.step(&mut sink, SocketHandle(0), 10), Step::Progress));
        assert!(matches!(job.step(&mut sink, SocketHandle(0), 10), Step::Finished));
        assert_eq!(sink.sent.len(), 200);
    }

    #[test]
    fn test_partial_sends_finish_the_pending_chunk() {
        let mut job = TransferJob::download(Box::new(Cursor::new(vec![1u8; 30])), 100);
        let mut sink = Sink { accept: 20, sent: Vec::new() };
        assert!(matches!(job.step(&mut sink, SocketHandle(0), 10), Step::Progress));
        assert!(matches!(job.step(&mut sink, SocketHandle(0), 10), Step::Finished));
        assert_eq!(sink.sent.len(), 30);
    }

    #[test]
    fn test_stall_fires_exactly_at_limit() {
        let mut job = TransferJob::download(Box::new(Cursor::new(vec![1u8; 30])), 100);
        let mut sink = Sink { accept: 0, sent: Vec::new() };
        for _ in 0..4 {
            assert!(matches!(job.step(&mut sink, SocketHandle(0), 5), Step::Progress));
        }
        assert_eq!(job.stall(), 4);
        assert!(matches!(job.step(&mut sink, SocketHandle(0), 5), Step::Stalled));
    }

    #[test]
    fn test_empty_listing_finishes_immediately() {
        let mut job = TransferJob::listing(String::new(), 0, false, 100);
        let mut sink = Sink { accept: 0, sent: Vec::new() };
        assert!(matches!(job.step(&mut sink, SocketHandle(0), 1), Step::Finished));
        assert_eq!(job.completion(), Completion::Matches { count: 0, mlsd: false });
    }

    #[test]
    fn test_throughput_is_saturating_and_monotonic() {
        assert_eq!(throughput_kbps(0, 1, 100), 0);
        assert_eq!(throughput_kbps(10_240, 100, 100), 10);
        assert_eq!(throughput_kbps(10_240, 0, 100), 1000);
        assert!(throughput_kbps(u64::MAX, 1, 100) > 0);
        let mut last = 0;
        for total in (0..100_000u64).step_by(997) {
            let k = throughput_kbps(total, 7, 100);
            assert!(k >= last);
            last = k;
        }
    }
}
