use std::io::{ErrorKind, Read, Write};

use bytes::{Bytes, BytesMut};
use eimu_frame::encode_frame;
use eimu_transport::{SerialLink, TransportError};
use tracing::{debug, trace, warn};

use crate::error::Result;

const INITIAL_BUFFER_CAPACITY: usize = 64;
const READ_CHUNK_SIZE: usize = 64;

/// A duplex byte channel the dispatcher can own.
///
/// Reads are expected to give up after a bounded time, reporting
/// `TimedOut`, `WouldBlock` or end-of-stream.
pub trait Transport: Read + Write {
    /// Drop bytes received but not yet read.
    fn discard_input(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Transport for SerialLink {
    fn discard_input(&mut self) -> std::io::Result<()> {
        self.clear_input().map_err(into_io_error)
    }
}

/// Keep the serial driver's error kind when crossing into `io::Error`.
fn into_io_error(err: TransportError) -> std::io::Error {
    match err {
        TransportError::Open { source, .. } | TransportError::Serial(source) => source.into(),
    }
}

/// How the reply to a request is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Exactly this many bytes.
    Exact(usize),
    /// One `\n`-terminated line of at most this many bytes.
    Line { max_len: usize },
}

/// Outcome of one request/reply exchange.
///
/// On failure `raw` is zero-filled to the expected length (`Reply::Exact`)
/// or empty (`Reply::Line`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub ok: bool,
    pub raw: Bytes,
}

impl Exchange {
    fn failed(reply: Reply) -> Self {
        let raw = match reply {
            Reply::Exact(len) => Bytes::from(vec![0u8; len]),
            Reply::Line { .. } => Bytes::new(),
        };
        Self { ok: false, raw }
    }
}

/// Issues one request and waits for exactly one reply per call.
///
/// Transport faults never escape: a failed write, a read error or a reply
/// cut short by the read timeout all come back as `Exchange { ok: false }`.
/// There is one request in flight at a time and no retry.
pub struct Dispatcher<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Send a binary frame and read exactly `expected_reply_bytes` back.
    ///
    /// An empty `payload` is sent as a zero length field. Fails only when the
    /// payload cannot be framed.
    pub fn call(
        &mut self,
        opcode: u8,
        payload: &[u8],
        expected_reply_bytes: usize,
    ) -> Result<Exchange> {
        let mut wire = BytesMut::new();
        encode_frame(opcode, payload, &mut wire)?;
        debug!(
            opcode,
            payload_len = payload.len(),
            expected_reply_bytes,
            "binary request"
        );
        Ok(self.exchange(&wire, Reply::Exact(expected_reply_bytes)))
    }

    /// Write an already encoded request and collect its reply.
    pub fn exchange(&mut self, request: &[u8], reply: Reply) -> Exchange {
        if let Err(err) = self.send(request) {
            warn!(error = %err, "request write failed; reporting failed exchange");
            return Exchange::failed(reply);
        }

        match reply {
            Reply::Exact(0) => Exchange {
                ok: true,
                raw: Bytes::new(),
            },
            Reply::Exact(len) => self.read_exact_bounded(len),
            Reply::Line { max_len } => self.read_line_bounded(max_len),
        }
    }

    /// Discard pending input on the transport.
    pub fn discard_input(&mut self) -> std::io::Result<()> {
        self.inner.discard_input()
    }

    fn send(&mut self, request: &[u8]) -> std::io::Result<()> {
        let mut offset = 0usize;
        while offset < request.len() {
            match self.inner.write(&request[offset..]) {
                Ok(0) => return Err(std::io::Error::from(ErrorKind::WriteZero)),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }

        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    fn read_exact_bounded(&mut self, len: usize) -> Exchange {
        self.buf.clear();
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        while self.buf.len() < len {
            let want = (len - self.buf.len()).min(READ_CHUNK_SIZE);
            match self.read_some(&mut chunk[..want]) {
                Some(n) => self.buf.extend_from_slice(&chunk[..n]),
                None => {
                    debug!(expected = len, received = self.buf.len(), "short reply");
                    return Exchange::failed(Reply::Exact(len));
                }
            }
        }

        trace!(received = len, "reply complete");
        Exchange {
            ok: true,
            raw: self.buf.split().freeze(),
        }
    }

    fn read_line_bounded(&mut self, max_len: usize) -> Exchange {
        self.buf.clear();
        let mut byte = [0u8; 1];

        loop {
            match self.read_some(&mut byte) {
                Some(_) if byte[0] == b'\n' => {
                    return Exchange {
                        ok: true,
                        raw: self.buf.split().freeze(),
                    };
                }
                Some(_) => {
                    self.buf.extend_from_slice(&byte);
                    if self.buf.len() > max_len {
                        warn!(max_len, "reply line too long");
                        return Exchange::failed(Reply::Line { max_len });
                    }
                }
                None => {
                    debug!(received = self.buf.len(), "unterminated reply line");
                    return Exchange::failed(Reply::Line { max_len });
                }
            }
        }
    }

    /// One read into `buf`; `None` once the transport times out, closes or fails.
    fn read_some(&mut self, buf: &mut [u8]) -> Option<usize> {
        loop {
            match self.inner.read(buf) {
                Ok(0) => return None,
                Ok(n) => return Some(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) =>
                {
                    return None;
                }
                Err(err) => {
                    warn!(error = %err, "transport read failed; reporting failed exchange");
                    return None;
                }
            }
        }
    }
}

impl<T> Dispatcher<T> {
    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the dispatcher and return the transport.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use bytes::BufMut;
    use eimu_frame::{FrameError, START_BYTE};

    use super::*;
    use crate::error::DriverError;
    use crate::testing::ScriptedPort;

    fn floats(values: &[f32]) -> Vec<u8> {
        let mut out = BytesMut::new();
        for v in values {
            out.put_f32_le(*v);
        }
        out.to_vec()
    }

    #[test]
    fn call_writes_frame_and_reads_reply() {
        let port = ScriptedPort::with_reply(floats(&[0.1, -0.2, 3.0]));
        let mut dispatcher = Dispatcher::new(port);

        let exchange = dispatcher.call(0x02, &[], 12).unwrap();
        assert!(exchange.ok);
        assert_eq!(exchange.raw.as_ref(), floats(&[0.1, -0.2, 3.0]).as_slice());

        let port = dispatcher.into_inner();
        assert_eq!(port.written, vec![START_BYTE, 0x02, 0x00, 0xBD]);
        assert_eq!(port.flushes, 1);
    }

    #[test]
    fn short_reply_is_zero_filled_failure() {
        let port = ScriptedPort::with_reply(vec![0xAA; 8]);
        let mut dispatcher = Dispatcher::new(port);

        let exchange = dispatcher.call(0x02, &[], 12).unwrap();
        assert!(!exchange.ok);
        assert_eq!(exchange.raw.as_ref(), &[0u8; 12]);
    }

    #[test]
    fn reply_arriving_in_pieces_is_assembled() {
        let port = ScriptedPort::with_reply(floats(&[1.0, 2.0])).one_byte_at_a_time();
        let mut dispatcher = Dispatcher::new(port);

        let exchange = dispatcher.call(0x18, &[], 8).unwrap();
        assert!(exchange.ok);
        assert_eq!(exchange.raw.as_ref(), floats(&[1.0, 2.0]).as_slice());
    }

    #[test]
    fn extra_bytes_stay_unread() {
        let mut reply = floats(&[5.0]);
        reply.extend_from_slice(&[1, 2, 3]);
        let mut dispatcher = Dispatcher::new(ScriptedPort::with_reply(reply));

        let exchange = dispatcher.call(0x12, &[], 4).unwrap();
        assert!(exchange.ok);
        assert_eq!(dispatcher.get_ref().remaining(), 3);
    }

    #[test]
    fn write_failure_is_reported_not_raised() {
        let port = ScriptedPort::with_reply(floats(&[1.0])).failing_writes();
        let mut dispatcher = Dispatcher::new(port);

        let exchange = dispatcher.call(0x12, &[], 4).unwrap();
        assert!(!exchange.ok);
        assert_eq!(exchange.raw.len(), 4);
    }

    #[test]
    fn read_fault_is_reported_not_raised() {
        let port = ScriptedPort::with_reply(floats(&[1.0])).failing_reads();
        let mut dispatcher = Dispatcher::new(port);

        let exchange = dispatcher.call(0x12, &[], 4).unwrap();
        assert!(!exchange.ok);
    }

    #[test]
    fn interrupted_io_is_retried() {
        let port = ScriptedPort::with_reply(floats(&[7.5])).interrupted_once();
        let mut dispatcher = Dispatcher::new(port);

        let exchange = dispatcher.call(0x12, &[], 4).unwrap();
        assert!(exchange.ok);
        assert_eq!(exchange.raw.as_ref(), floats(&[7.5]).as_slice());
    }

    #[test]
    fn zero_length_reply_succeeds_after_write() {
        let mut dispatcher = Dispatcher::new(ScriptedPort::silent());
        let exchange = dispatcher.call(0x11, &[0, 0, 0, 0, 0], 0).unwrap();
        assert!(exchange.ok);
        assert!(exchange.raw.is_empty());
        assert_eq!(dispatcher.get_ref().written.len(), 9);
    }

    #[test]
    fn oversized_payload_is_an_error() {
        let mut dispatcher = Dispatcher::new(ScriptedPort::silent());
        let err = dispatcher.call(0x01, &[0u8; 300], 0).unwrap_err();
        assert!(matches!(
            err,
            DriverError::Frame(FrameError::PayloadTooLarge { size: 300, .. })
        ));
        assert!(dispatcher.get_ref().written.is_empty());
    }

    #[test]
    fn line_reply_stops_at_newline() {
        let mut dispatcher = Dispatcher::new(ScriptedPort::with_reply(b"1.5 2.5\r\nnext".to_vec()));
        let exchange = dispatcher.exchange(b"2\r", Reply::Line { max_len: 64 });
        assert!(exchange.ok);
        assert_eq!(exchange.raw.as_ref(), b"1.5 2.5\r");
        assert_eq!(dispatcher.get_ref().remaining(), 4);
    }

    #[test]
    fn unterminated_line_is_failure() {
        let mut dispatcher = Dispatcher::new(ScriptedPort::with_reply(b"1.5 2.5".to_vec()));
        let exchange = dispatcher.exchange(b"2\r", Reply::Line { max_len: 64 });
        assert!(!exchange.ok);
        assert!(exchange.raw.is_empty());
    }

    #[test]
    fn overlong_line_is_failure() {
        let mut dispatcher = Dispatcher::new(ScriptedPort::with_reply(vec![b'9'; 32]));
        let exchange = dispatcher.exchange(b"2\r", Reply::Line { max_len: 8 });
        assert!(!exchange.ok);
    }

    #[test]
    fn repeated_calls_give_same_outcome_pattern() {
        let mut reply = floats(&[0.1, 0.2, 0.3]);
        reply.extend(floats(&[0.4, 0.5, 0.6]));
        let mut dispatcher = Dispatcher::new(ScriptedPort::with_reply(reply));

        let first = dispatcher.call(0x02, &[], 12).unwrap();
        let second = dispatcher.call(0x02, &[], 12).unwrap();
        assert_eq!(first.ok, second.ok);
        assert_ne!(first.raw, second.raw);
    }

    #[test]
    fn serial_errors_keep_their_io_kind() {
        let err = into_io_error(TransportError::Serial(serialport::Error::new(
            serialport::ErrorKind::Io(ErrorKind::BrokenPipe),
            "unplugged",
        )));
        assert_eq!(err.kind(), ErrorKind::BrokenPipe);

        let err = into_io_error(TransportError::Serial(serialport::Error::new(
            serialport::ErrorKind::NoDevice,
            "gone",
        )));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
