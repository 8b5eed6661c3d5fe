//! Command framing and payload codec for EIMU modules.
//!
//! Every request sent to the module is framed as:
//! - A 1-byte start sentinel (`0xBB`)
//! - A 1-byte opcode selecting the command
//! - A 1-byte payload length
//! - The payload (optional selector byte + little-endian f32 values)
//! - A 1-byte additive checksum over everything before it
//!
//! Replies are bare little-endian f32 values whose count is fixed per command
//! by the [`command`] registry. The [`text`] module carries the same contract
//! over the older line-based ASCII protocol.

pub mod codec;
pub mod command;
pub mod error;
pub mod text;

pub use codec::{
    checksum, decode_floats, encode_floats, encode_frame, float_payload, FloatReply, Frame,
    FLOAT_SIZE, HEADER_SIZE, MAX_ARITY, MAX_PAYLOAD, START_BYTE, TRAILER_SIZE,
};
pub use command::{Command, CommandSpec, Direction, PayloadShape};
pub use error::{FrameError, Result};
pub use text::{decode_text_reply, encode_text_request, MAX_TEXT_ARGS, TEXT_TERMINATOR};
