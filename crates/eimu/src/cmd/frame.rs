use bytes::{Bytes, BytesMut};
use eimu_driver::request_values;
use eimu_frame::{encode_text_request, float_payload, Command, Frame};
use serde::Serialize;

use crate::cmd::{FrameArgs, ProtocolArg};
use crate::exit::{driver_error, frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct FrameOutput {
    command: &'static str,
    opcode: u8,
    protocol: &'static str,
    size: usize,
    bytes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    reply_bytes: Option<usize>,
}

pub fn run(args: FrameArgs, format: OutputFormat) -> CliResult<i32> {
    let command = Command::from_name(&args.command).ok_or_else(|| {
        CliError::new(
            USAGE,
            format!("unknown command: {} (see `eimu commands`)", args.command),
        )
    })?;
    let spec = command.spec();

    let (selector, values) = request_values(command, args.selector, args.value.as_slice())
        .map_err(|err| driver_error("invalid request", err))?;
    let wire = match args.protocol {
        ProtocolArg::Binary => binary_request(spec.opcode, selector, &values)?,
        ProtocolArg::Text => text_request(spec.opcode, selector, &values)?,
    };

    let out = FrameOutput {
        command: spec.name,
        opcode: spec.opcode,
        protocol: match args.protocol {
            ProtocolArg::Binary => "binary",
            ProtocolArg::Text => "text",
        },
        size: wire.len(),
        bytes: hex(&wire),
        text: matches!(args.protocol, ProtocolArg::Text)
            .then(|| String::from_utf8_lossy(&wire).escape_debug().to_string()),
        // Text replies are a line of unknown length.
        reply_bytes: matches!(args.protocol, ProtocolArg::Binary).then_some(spec.reply_len()),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut rows = vec![
                vec!["command".to_string(), out.command.to_string()],
                vec!["opcode".to_string(), format!("0x{:02X}", out.opcode)],
                vec!["protocol".to_string(), out.protocol.to_string()],
                vec!["size".to_string(), out.size.to_string()],
                vec!["bytes".to_string(), out.bytes.clone()],
            ];
            if let Some(text) = &out.text {
                rows.push(vec!["text".to_string(), text.clone()]);
            }
            if let Some(reply) = out.reply_bytes {
                rows.push(vec!["reply bytes".to_string(), reply.to_string()]);
            }
            print_table(vec!["FIELD", "VALUE"], rows);
        }
        OutputFormat::Pretty => println!("{} ({}): {}", out.command, out.protocol, out.bytes),
    }

    Ok(SUCCESS)
}

fn binary_request(opcode: u8, selector: Option<u8>, values: &[f32]) -> CliResult<Bytes> {
    let payload = if selector.is_none() && values.is_empty() {
        BytesMut::new()
    } else {
        float_payload(values, selector).map_err(|err| frame_error("payload encoding failed", err))?
    };
    Frame::new(opcode, payload.freeze())
        .to_bytes()
        .map_err(|err| frame_error("frame encoding failed", err))
}

fn text_request(opcode: u8, selector: Option<u8>, values: &[f32]) -> CliResult<Bytes> {
    let args: Vec<f32> = selector
        .map(f32::from)
        .into_iter()
        .chain(values.iter().copied())
        .collect();
    let mut dst = BytesMut::new();
    encode_text_request(opcode, &args, &mut dst)
        .map_err(|err| frame_error("text encoding failed", err))?;
    Ok(dst.freeze())
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_for(command: Command, selector: Option<u8>, value: Option<f32>) -> CliResult<Bytes> {
        let (selector, values) = request_values(command, selector, value.as_slice())
            .map_err(|err| driver_error("invalid request", err))?;
        binary_request(command.opcode(), selector, &values)
    }

    #[test]
    fn empty_read_frame() {
        let wire = wire_for(Command::ReadRpy, None, None).unwrap();
        assert_eq!(hex(&wire), "BB 02 00 BD");
    }

    #[test]
    fn value_write_frame_uses_selector_zero() {
        let wire = wire_for(Command::SetFilterGain, None, Some(1.0)).unwrap();
        assert_eq!(hex(&wire), "BB 11 05 00 00 00 80 3F 90");
    }

    #[test]
    fn indexed_read_frame_sends_zero_value() {
        let wire = wire_for(Command::ReadGyroOffset, Some(2), None).unwrap();
        assert_eq!(hex(&wire), "BB 0D 05 02 00 00 00 00 CF");
    }

    #[test]
    fn indexed_frame_requires_selector() {
        let err = wire_for(Command::WriteAccOffset, None, Some(1.0)).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn empty_frame_rejects_value() {
        let err = wire_for(Command::ReadRpy, None, Some(1.0)).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn text_request_line() {
        let wire = text_request(0x04, Some(2), &[0.5]).unwrap();
        assert_eq!(wire.as_ref(), b"4 2 0.5\r");
    }
}
