use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Sentinel opening every request frame.
pub const START_BYTE: u8 = 0xBB;

/// Frame header: start (1) + opcode (1) + length (1) = 3 bytes.
pub const HEADER_SIZE: usize = 3;

/// Frame trailer: checksum (1).
pub const TRAILER_SIZE: usize = 1;

/// Largest payload the one-byte length field can describe.
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// Wire size of one encoded value.
pub const FLOAT_SIZE: usize = 4;

/// Largest number of values any command exchanges.
pub const MAX_ARITY: usize = 9;

/// A request frame addressed to the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command selector, see [`crate::Command`].
    pub opcode: u8,
    /// Raw payload bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(opcode: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            opcode,
            payload: payload.into(),
        }
    }

    /// Value of the length field.
    pub fn length(&self) -> usize {
        self.payload.len()
    }

    /// Trailing checksum this frame carries on the wire.
    pub fn checksum(&self) -> u8 {
        let header = [START_BYTE, self.opcode, self.payload.len() as u8];
        checksum(&header).wrapping_add(checksum(&self.payload))
    }

    /// The total wire size of this frame (header + payload + checksum).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + TRAILER_SIZE
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut dst = BytesMut::with_capacity(self.wire_size());
        encode_frame(self.opcode, &self.payload, &mut dst)?;
        Ok(dst.freeze())
    }

    /// Parse a captured request frame, checking sentinel, length and checksum.
    ///
    /// Bytes after the checksum are ignored. Device replies are not framed and
    /// never go through here.
    pub fn parse(wire: &[u8]) -> Result<Self> {
        if wire.len() < HEADER_SIZE + TRAILER_SIZE {
            return Err(FrameError::Truncated {
                len: wire.len(),
                needed: HEADER_SIZE + TRAILER_SIZE,
            });
        }
        if wire[0] != START_BYTE {
            return Err(FrameError::InvalidStartByte { found: wire[0] });
        }

        let length = wire[2] as usize;
        let needed = HEADER_SIZE + length + TRAILER_SIZE;
        if wire.len() < needed {
            return Err(FrameError::Truncated {
                len: wire.len(),
                needed,
            });
        }

        let expected = checksum(&wire[..needed - TRAILER_SIZE]);
        let actual = wire[needed - TRAILER_SIZE];
        if expected != actual {
            return Err(FrameError::ChecksumMismatch { expected, actual });
        }

        Ok(Self {
            opcode: wire[1],
            payload: Bytes::copy_from_slice(&wire[HEADER_SIZE..HEADER_SIZE + length]),
        })
    }
}

/// Arithmetic sum of `bytes` modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Encode a request frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────┬────────┬────────┬──────────────────┬──────────┐
/// │ Start  │ Opcode │ Length │ Payload          │ Checksum │
/// │ 0xBB   │ (1B)   │ (1B)   │ (Length bytes)   │ (1B)     │
/// └────────┴────────┴────────┴──────────────────┴──────────┘
/// ```
/// The checksum is the sum of every preceding byte modulo 256.
pub fn encode_frame(opcode: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    let start = dst.len();
    dst.reserve(HEADER_SIZE + payload.len() + TRAILER_SIZE);
    dst.put_u8(START_BYTE);
    dst.put_u8(opcode);
    dst.put_u8(payload.len() as u8);
    dst.put_slice(payload);
    let sum = checksum(&dst[start..]);
    dst.put_u8(sum);
    Ok(())
}

/// Pack `values` as little-endian f32, optionally behind a selector byte.
pub fn float_payload(values: &[f32], selector: Option<u8>) -> Result<BytesMut> {
    let size = usize::from(selector.is_some()) + values.len() * FLOAT_SIZE;
    if size > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size,
            max: MAX_PAYLOAD,
        });
    }
    let mut payload = BytesMut::with_capacity(size);
    if let Some(selector) = selector {
        payload.put_u8(selector);
    }
    for value in values {
        payload.put_f32_le(*value);
    }
    Ok(payload)
}

/// Encode a frame whose payload is `[selector] + f32_le(values)...`.
pub fn encode_floats(
    opcode: u8,
    values: &[f32],
    selector: Option<u8>,
    dst: &mut BytesMut,
) -> Result<()> {
    let payload = float_payload(values, selector)?;
    encode_frame(opcode, &payload, dst)
}

/// Values decoded from a reply, with a success flag.
///
/// A failed reply still carries `arity` values, all zero, so callers can
/// destructure it without looking at the shape.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatReply {
    pub ok: bool,
    pub values: Vec<f32>,
}

impl FloatReply {
    pub fn new(values: Vec<f32>) -> Self {
        Self { ok: true, values }
    }

    /// The all-zero failure value for a reply of `arity` values.
    pub fn failed(arity: usize) -> Self {
        Self {
            ok: false,
            values: vec![0.0; arity],
        }
    }

    pub fn arity(&self) -> usize {
        self.values.len()
    }

    /// Value at `index`, or zero past the end.
    pub fn value(&self, index: usize) -> f32 {
        self.values.get(index).copied().unwrap_or(0.0)
    }
}

/// Decode exactly `arity` little-endian f32 values from `raw`.
///
/// `raw` must be exactly `4 * arity` bytes long; anything else yields a
/// failed, zero-filled reply. No integrity check is applied: the module's
/// replies carry no checksum, so the byte count is all there is to trust.
pub fn decode_floats(raw: &[u8], arity: usize) -> FloatReply {
    if raw.len() != arity * FLOAT_SIZE {
        return FloatReply::failed(arity);
    }
    let mut buf = raw;
    let values = (0..arity).map(|_| buf.get_f32_le()).collect();
    FloatReply::new(values)
}
