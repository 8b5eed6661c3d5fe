use eimu_frame::{Command, CommandSpec, Direction, PayloadShape};

use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

pub fn run(format: OutputFormat) -> CliResult<i32> {
    let specs: Vec<CommandSpec> = Command::ALL.iter().map(|command| command.spec()).collect();

    match format {
        OutputFormat::Json => print_json(&specs),
        OutputFormat::Table => {
            let rows = specs
                .iter()
                .map(|spec| {
                    vec![
                        format!("0x{:02X}", spec.opcode),
                        spec.name.to_string(),
                        direction_label(spec.direction).to_string(),
                        payload_label(spec.payload).to_string(),
                        spec.reply_arity.to_string(),
                    ]
                })
                .collect();
            print_table(vec!["OPCODE", "NAME", "DIRECTION", "PAYLOAD", "REPLY"], rows);
        }
        OutputFormat::Pretty => {
            for spec in &specs {
                println!(
                    "0x{:02X} {:<20} {:<10} {:<7} {} float(s)",
                    spec.opcode,
                    spec.name,
                    direction_label(spec.direction),
                    payload_label(spec.payload),
                    spec.reply_arity
                );
            }
        }
    }

    Ok(SUCCESS)
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Read => "read",
        Direction::Write => "write",
        Direction::ReadWrite => "read-write",
    }
}

fn payload_label(payload: PayloadShape) -> &'static str {
    match payload {
        PayloadShape::Empty => "empty",
        PayloadShape::Indexed => "indexed",
        PayloadShape::Value => "value",
    }
}
