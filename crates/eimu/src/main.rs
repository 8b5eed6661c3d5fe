mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "eimu", version, about = "EIMU attitude/inertial module CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level for eimu's own crates (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        env = "EIMU_LOG",
        default_value = "warn",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{ReadTarget, SetCommand};

    #[test]
    fn parses_read_subcommand() {
        let cli = Cli::try_parse_from([
            "eimu",
            "read",
            "imu",
            "--port",
            "/dev/ttyUSB0",
            "--protocol",
            "text",
        ])
        .expect("read args should parse");

        match cli.command {
            Command::Read(args) => {
                assert_eq!(args.target, ReadTarget::Imu);
                assert_eq!(args.connect.port.to_str(), Some("/dev/ttyUSB0"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_set_with_negative_value() {
        let cli = Cli::try_parse_from(["eimu", "set", "acc-offset", "y", "-0.25"])
            .expect("set args should parse");
        match cli.command {
            Command::Set(args) => match args.setting {
                SetCommand::AccOffset(axis_value) => assert_eq!(axis_value.value, -0.25),
                other => panic!("unexpected setting: {other:?}"),
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_frame() {
        let err = Cli::try_parse_from(["eimu", "set", "frame", "xyz"])
            .expect_err("unknown frame should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn log_level_flag_parses() {
        let cli = Cli::try_parse_from(["eimu", "--log-level", "debug", "commands"])
            .expect("log level should parse");
        assert_eq!(cli.log_level, LogLevel::Debug);
    }

    #[test]
    fn parses_stream_subcommand() {
        let cli = Cli::try_parse_from([
            "eimu", "stream", "rpy", "--rate-hz", "50", "--count", "10",
        ])
        .expect("stream args should parse");
        match cli.command {
            Command::Stream(args) => {
                assert_eq!(args.rate_hz, 50.0);
                assert_eq!(args.count, Some(10));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
