use bytes::BytesMut;
use eimu_frame::{
    decode_floats, decode_text_reply, encode_text_request, float_payload, Command, FloatReply,
    PayloadShape,
};
use tracing::debug;

use crate::config::{Protocol, DEFAULT_MAX_LINE_LEN};
use crate::dispatcher::{Dispatcher, Reply, Transport};
use crate::error::{DriverError, Result};

/// One request/one reply command exchange, independent of wire encoding.
///
/// A reply that does not arrive in full is an `Ok` reply with `ok == false`
/// and zero-filled values; `Err` is kept for requests that cannot be encoded
/// and replies that cannot be parsed at all.
pub trait CommandChannel {
    /// Wire encoding this channel speaks.
    fn protocol(&self) -> Protocol;

    /// Send `command` and decode its reply to `command.reply_arity()` values.
    ///
    /// `selector` addresses one element of an array register; `args` holds
    /// at most one value.
    fn request(&mut self, command: Command, selector: Option<u8>, args: &[f32])
        -> Result<FloatReply>;

    /// Drop any reply bytes still buffered on the host side.
    fn discard_input(&mut self) -> Result<()>;
}

/// Selector and values to put on the wire for `command`.
///
/// Checks `selector` and `args` against the command's payload shape: empty
/// commands take neither, indexed commands need a selector, value commands
/// default the selector to `0`. At most one value is accepted.
pub fn request_values(
    command: Command,
    selector: Option<u8>,
    args: &[f32],
) -> Result<(Option<u8>, Vec<f32>)> {
    let spec = command.spec();
    match spec.payload {
        PayloadShape::Empty => {
            if selector.is_some() || !args.is_empty() {
                return Err(DriverError::InvalidArgument(format!(
                    "{command} takes no arguments"
                )));
            }
            Ok((None, Vec::new()))
        }
        PayloadShape::Indexed | PayloadShape::Value => {
            if args.len() > 1 {
                return Err(DriverError::InvalidArgument(format!(
                    "{command} takes one value, got {}",
                    args.len()
                )));
            }
            if spec.payload == PayloadShape::Indexed && selector.is_none() {
                return Err(DriverError::InvalidArgument(format!(
                    "{command} needs a register index"
                )));
            }
            let value = args.first().copied().unwrap_or(0.0);
            Ok((Some(selector.unwrap_or(0)), vec![value]))
        }
    }
}

/// Checksummed binary frames out, bare little-endian f32 replies back.
pub struct BinaryChannel<T> {
    dispatcher: Dispatcher<T>,
}

impl<T: Transport> BinaryChannel<T> {
    pub fn new(transport: T) -> Self {
        Self {
            dispatcher: Dispatcher::new(transport),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    pub fn into_inner(self) -> T {
        self.dispatcher.into_inner()
    }
}

impl<T: Transport> CommandChannel for BinaryChannel<T> {
    fn protocol(&self) -> Protocol {
        Protocol::Binary
    }

    fn request(
        &mut self,
        command: Command,
        selector: Option<u8>,
        args: &[f32],
    ) -> Result<FloatReply> {
        let spec = command.spec();
        let (selector, values) = request_values(command, selector, args)?;
        let payload = if spec.payload.is_empty() {
            BytesMut::new()
        } else {
            float_payload(&values, selector)?
        };

        let exchange = self
            .dispatcher
            .call(spec.opcode, &payload, spec.reply_len())?;
        if !exchange.ok {
            debug!(%command, "no complete reply");
            return Ok(FloatReply::failed(spec.reply_arity));
        }
        Ok(decode_floats(&exchange.raw, spec.reply_arity))
    }

    fn discard_input(&mut self) -> Result<()> {
        self.dispatcher.discard_input()?;
        Ok(())
    }
}

/// Decimal text lines out and back, for older firmware.
pub struct TextChannel<T> {
    dispatcher: Dispatcher<T>,
    max_line_len: usize,
}

impl<T: Transport> TextChannel<T> {
    pub fn new(transport: T) -> Self {
        Self::with_max_line_len(transport, DEFAULT_MAX_LINE_LEN)
    }

    pub fn with_max_line_len(transport: T, max_line_len: usize) -> Self {
        Self {
            dispatcher: Dispatcher::new(transport),
            max_line_len,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    pub fn into_inner(self) -> T {
        self.dispatcher.into_inner()
    }
}

impl<T: Transport> CommandChannel for TextChannel<T> {
    fn protocol(&self) -> Protocol {
        Protocol::Text
    }

    fn request(
        &mut self,
        command: Command,
        selector: Option<u8>,
        args: &[f32],
    ) -> Result<FloatReply> {
        let spec = command.spec();
        let (selector, values) = request_values(command, selector, args)?;
        let mut text_args: Vec<f32> = selector.map(f32::from).into_iter().collect();
        text_args.extend(values);

        let mut request = BytesMut::new();
        encode_text_request(spec.opcode, &text_args, &mut request)?;
        debug!(%command, args = text_args.len(), "text request");

        let exchange = self.dispatcher.exchange(
            &request,
            Reply::Line {
                max_len: self.max_line_len,
            },
        );
        if !exchange.ok {
            debug!(%command, "no complete reply line");
            return Ok(FloatReply::failed(spec.reply_arity));
        }

        let line = String::from_utf8_lossy(&exchange.raw);
        Ok(decode_text_reply(&line, spec.reply_arity)?)
    }

    fn discard_input(&mut self) -> Result<()> {
        self.dispatcher.discard_input()?;
        Ok(())
    }
}

/// A channel whose wire encoding is picked at construction time.
pub enum AnyChannel<T> {
    Binary(BinaryChannel<T>),
    Text(TextChannel<T>),
}

impl<T: Transport> AnyChannel<T> {
    pub fn new(protocol: Protocol, transport: T) -> Self {
        match protocol {
            Protocol::Binary => AnyChannel::Binary(BinaryChannel::new(transport)),
            Protocol::Text => AnyChannel::Text(TextChannel::new(transport)),
        }
    }

    pub fn with_max_line_len(protocol: Protocol, transport: T, max_line_len: usize) -> Self {
        match protocol {
            Protocol::Binary => AnyChannel::Binary(BinaryChannel::new(transport)),
            Protocol::Text => {
                AnyChannel::Text(TextChannel::with_max_line_len(transport, max_line_len))
            }
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            AnyChannel::Binary(channel) => channel.into_inner(),
            AnyChannel::Text(channel) => channel.into_inner(),
        }
    }
}

impl<T: Transport> CommandChannel for AnyChannel<T> {
    fn protocol(&self) -> Protocol {
        match self {
            AnyChannel::Binary(channel) => channel.protocol(),
            AnyChannel::Text(channel) => channel.protocol(),
        }
    }

    fn request(
        &mut self,
        command: Command,
        selector: Option<u8>,
        args: &[f32],
    ) -> Result<FloatReply> {
        match self {
            AnyChannel::Binary(channel) => channel.request(command, selector, args),
            AnyChannel::Text(channel) => channel.request(command, selector, args),
        }
    }

    fn discard_input(&mut self) -> Result<()> {
        match self {
            AnyChannel::Binary(channel) => channel.discard_input(),
            AnyChannel::Text(channel) => channel.discard_input(),
        }
    }
}
