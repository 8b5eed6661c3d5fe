use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use eimu_driver::{Axis, DriverConfig, Eimu, Protocol, ReferenceFrame};
use eimu_transport::{SerialConfig, DEFAULT_BAUD_RATE};

use crate::exit::{driver_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod commands;
pub mod frame;
pub mod ports;
pub mod read;
pub mod set;
pub mod stream;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read one value from the module.
    Read(ReadArgs),
    /// Change a module setting.
    Set(SetArgs),
    /// Poll a value at a fixed rate until interrupted.
    Stream(StreamArgs),
    /// Print the request bytes for a command without opening a port.
    Frame(FrameArgs),
    /// List the command registry.
    Commands,
    /// List serial ports visible to this host.
    Ports,
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Read(args) => read::run(args, format),
        Command::Set(args) => set::run(args, format),
        Command::Stream(args) => stream::run(args, format),
        Command::Frame(args) => frame::run(args, format),
        Command::Commands => commands::run(format),
        Command::Ports => ports::run(format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ProtocolArg {
    Binary,
    Text,
}

impl From<ProtocolArg> for Protocol {
    fn from(arg: ProtocolArg) -> Self {
        match arg {
            ProtocolArg::Binary => Protocol::Binary,
            ProtocolArg::Text => Protocol::Text,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum AxisArg {
    X,
    Y,
    Z,
}

impl From<AxisArg> for Axis {
    fn from(arg: AxisArg) -> Self {
        match arg {
            AxisArg::X => Axis::X,
            AxisArg::Y => Axis::Y,
            AxisArg::Z => Axis::Z,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FrameArg {
    Nwu,
    Enu,
    Ned,
}

impl From<FrameArg> for ReferenceFrame {
    fn from(arg: FrameArg) -> Self {
        match arg {
            FrameArg::Nwu => ReferenceFrame::Nwu,
            FrameArg::Enu => ReferenceFrame::Enu,
            FrameArg::Ned => ReferenceFrame::Ned,
        }
    }
}

/// Values `read` and `stream` can fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReadTarget {
    Quat,
    Rpy,
    RpyVariance,
    Acc,
    AccRaw,
    AccVariance,
    AccOffset,
    LinearAcc,
    Gyro,
    GyroRaw,
    GyroVariance,
    GyroOffset,
    AccGyro,
    Orientation,
    Imu,
    Gain,
    Frame,
}

impl ReadTarget {
    pub fn name(self) -> &'static str {
        match self {
            ReadTarget::Quat => "quat",
            ReadTarget::Rpy => "rpy",
            ReadTarget::RpyVariance => "rpy-variance",
            ReadTarget::Acc => "acc",
            ReadTarget::AccRaw => "acc-raw",
            ReadTarget::AccVariance => "acc-variance",
            ReadTarget::AccOffset => "acc-offset",
            ReadTarget::LinearAcc => "linear-acc",
            ReadTarget::Gyro => "gyro",
            ReadTarget::GyroRaw => "gyro-raw",
            ReadTarget::GyroVariance => "gyro-variance",
            ReadTarget::GyroOffset => "gyro-offset",
            ReadTarget::AccGyro => "acc-gyro",
            ReadTarget::Orientation => "orientation",
            ReadTarget::Imu => "imu",
            ReadTarget::Gain => "gain",
            ReadTarget::Frame => "frame",
        }
    }
}

/// Serial connection flags shared by every command that talks to a module.
#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    /// Serial device path.
    #[arg(long, short = 'p', env = "EIMU_PORT", default_value = "/dev/ttyACM0")]
    pub port: PathBuf,
    /// Line speed in baud.
    #[arg(long, env = "EIMU_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Per-read timeout (e.g. 100ms, 1s).
    #[arg(long, default_value = "100ms")]
    pub timeout: String,
    /// Firmware wire encoding.
    #[arg(long, value_enum, default_value = "binary")]
    pub protocol: ProtocolArg,
}

impl ConnectArgs {
    pub fn driver_config(&self) -> CliResult<DriverConfig> {
        let serial = SerialConfig::new(self.port.clone())
            .with_baud_rate(self.baud)
            .with_read_timeout(parse_duration(&self.timeout)?);
        Ok(DriverConfig::new(serial).with_protocol(self.protocol.into()))
    }

    pub fn connect(&self) -> CliResult<Eimu> {
        let config = self.driver_config()?;
        Eimu::connect(&config).map_err(|err| driver_error("connect failed", err))
    }
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Value to read.
    #[arg(value_enum)]
    pub target: ReadTarget,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    #[command(subcommand)]
    pub setting: SetCommand,
}

#[derive(Subcommand, Debug)]
pub enum SetCommand {
    /// Orientation filter gain.
    Gain { value: f32 },
    /// Reference frame for orientation output.
    Frame {
        #[arg(value_enum)]
        frame: FrameArg,
    },
    /// One axis of the roll/pitch/yaw variance.
    RpyVariance(AxisValueArgs),
    /// One axis of the accelerometer offset.
    AccOffset(AxisValueArgs),
    /// One axis of the accelerometer variance.
    AccVariance(AxisValueArgs),
    /// One axis of the gyroscope offset.
    GyroOffset(AxisValueArgs),
    /// One axis of the gyroscope variance.
    GyroVariance(AxisValueArgs),
    /// Restore factory parameters.
    Reset,
    /// Drop buffered data on both ends of the link.
    ClearBuffer,
}

#[derive(Args, Debug)]
pub struct AxisValueArgs {
    #[arg(value_enum)]
    pub axis: AxisArg,
    #[arg(allow_negative_numbers = true)]
    pub value: f32,
}

#[derive(Args, Debug)]
pub struct StreamArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Value to poll.
    #[arg(value_enum)]
    pub target: ReadTarget,
    /// Polls per second.
    #[arg(long, default_value_t = 20.0)]
    pub rate_hz: f64,
    /// Exit after N readings.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct FrameArgs {
    /// Command name as listed by `eimu commands`.
    pub command: String,
    /// Register index for per-axis commands.
    #[arg(long)]
    pub selector: Option<u8>,
    /// Value carried by write commands.
    #[arg(long, allow_negative_numbers = true)]
    pub value: Option<f32>,
    /// Wire encoding to render.
    #[arg(long, value_enum, default_value = "binary")]
    pub protocol: ProtocolArg,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(match unit {
        "ms" => Duration::from_millis(value),
        _ => Duration::from_secs(value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn connect_args_build_driver_config() {
        let args = ConnectArgs {
            port: PathBuf::from("/dev/ttyUSB1"),
            baud: 57_600,
            timeout: "250ms".to_string(),
            protocol: ProtocolArg::Text,
        };
        let config = args.driver_config().unwrap();
        assert_eq!(config.serial.path, PathBuf::from("/dev/ttyUSB1"));
        assert_eq!(config.serial.baud_rate, 57_600);
        assert_eq!(config.serial.read_timeout, Duration::from_millis(250));
        assert_eq!(config.protocol, Protocol::Text);
    }

    #[test]
    fn read_target_names_match_cli_values() {
        for target in ReadTarget::value_variants() {
            let value = target.to_possible_value().unwrap();
            assert_eq!(value.get_name(), target.name());
        }
    }
}
