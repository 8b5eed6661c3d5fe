//! In-memory transport double for driver tests.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};

use bytes::{BufMut, BytesMut};

use crate::dispatcher::Transport;

/// Replays scripted reply bytes and records everything written.
///
/// Once the script runs dry, reads time out like a quiet serial line.
#[derive(Debug, Default)]
pub(crate) struct ScriptedPort {
    /// Bytes already waiting before any request (cleared by `discard_input`).
    stale: VecDeque<u8>,
    reply: VecDeque<u8>,
    pub written: Vec<u8>,
    pub flushes: usize,
    pub discards: usize,
    max_read: Option<usize>,
    fail_reads: bool,
    fail_writes: bool,
    fail_discards: bool,
    interrupt_read: bool,
    interrupt_write: bool,
}

impl ScriptedPort {
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn with_reply(reply: Vec<u8>) -> Self {
        Self {
            reply: reply.into(),
            ..Self::default()
        }
    }

    pub fn with_floats(values: &[f32]) -> Self {
        let mut reply = BytesMut::new();
        for value in values {
            reply.put_f32_le(*value);
        }
        Self::with_reply(reply.to_vec())
    }

    pub fn with_stale(mut self, stale: Vec<u8>) -> Self {
        self.stale = stale.into();
        self
    }

    pub fn one_byte_at_a_time(mut self) -> Self {
        self.max_read = Some(1);
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn failing_discards(mut self) -> Self {
        self.fail_discards = true;
        self
    }

    pub fn interrupted_once(mut self) -> Self {
        self.interrupt_read = true;
        self.interrupt_write = true;
        self
    }

    pub fn remaining(&self) -> usize {
        self.stale.len() + self.reply.len()
    }
}

impl Read for ScriptedPort {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.interrupt_read {
            self.interrupt_read = false;
            return Err(ErrorKind::Interrupted.into());
        }
        if self.fail_reads {
            return Err(std::io::Error::new(ErrorKind::BrokenPipe, "device unplugged"));
        }

        let limit = self.max_read.unwrap_or(usize::MAX).min(buf.len());
        let mut n = 0;
        while n < limit {
            let next = match self.stale.pop_front() {
                Some(byte) => byte,
                None => match self.reply.pop_front() {
                    Some(byte) => byte,
                    None => break,
                },
            };
            buf[n] = next;
            n += 1;
        }

        if n == 0 && !buf.is_empty() {
            return Err(ErrorKind::TimedOut.into());
        }
        Ok(n)
    }
}

impl Write for ScriptedPort {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.interrupt_write {
            self.interrupt_write = false;
            return Err(ErrorKind::Interrupted.into());
        }
        if self.fail_writes {
            return Err(std::io::Error::new(ErrorKind::BrokenPipe, "device unplugged"));
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

impl Transport for ScriptedPort {
    fn discard_input(&mut self) -> std::io::Result<()> {
        self.discards += 1;
        if self.fail_discards {
            return Err(std::io::Error::new(ErrorKind::BrokenPipe, "device unplugged"));
        }
        self.stale.clear();
        Ok(())
    }
}
