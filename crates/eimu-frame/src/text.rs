//! Line-based ASCII encoding of the command contract.
//!
//! Older firmware speaks decimal text instead of binary frames: a request is
//! `"<opcode> <arg> <arg>\r"` and the reply is one newline-terminated line of
//! decimals. Write commands answer with the single token `1` on success.

use bytes::{BufMut, BytesMut};

use crate::codec::FloatReply;
use crate::error::{FrameError, Result};

/// Terminator appended to every text request.
pub const TEXT_TERMINATOR: u8 = b'\r';

/// Most arguments a text request can carry.
pub const MAX_TEXT_ARGS: usize = 3;

/// Encode `opcode` and `args` as a text request line.
pub fn encode_text_request(opcode: u8, args: &[f32], dst: &mut BytesMut) -> Result<()> {
    if args.len() > MAX_TEXT_ARGS {
        return Err(FrameError::TooManyArguments {
            count: args.len(),
            max: MAX_TEXT_ARGS,
        });
    }
    let mut line = opcode.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.to_string());
    }
    dst.reserve(line.len() + 1);
    dst.put_slice(line.as_bytes());
    dst.put_u8(TEXT_TERMINATOR);
    Ok(())
}

/// Parse a reply line expected to hold `arity` values.
///
/// A token that is not a number is a hard error. A well-formed line with the
/// wrong number of values is a failed, zero-filled reply. For `arity == 0` the
/// line is a write acknowledgement and succeeds only when it reads `1`.
pub fn decode_text_reply(line: &str, arity: usize) -> Result<FloatReply> {
    let values = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<f32>().map_err(|_| FrameError::InvalidNumber {
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<f32>>>()?;

    if arity == 0 {
        return Ok(match values.as_slice() {
            [ack] if *ack == 1.0 => FloatReply::new(Vec::new()),
            _ => FloatReply::failed(0),
        });
    }

    if values.len() != arity {
        return Ok(FloatReply::failed(arity));
    }
    Ok(FloatReply::new(values))
}
