//! Command registry.
//!
//! Each command has a fixed opcode, payload shape and reply arity. The table
//! is compiled in and forms the contract between the driver facade and the
//! wire: a reply is valid exactly when it carries `4 * reply_arity` bytes.

use serde::{Deserialize, Serialize};

use crate::codec::FLOAT_SIZE;

/// Whether a command reads device state, changes it, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Read,
    Write,
    ReadWrite,
}

/// Layout of a request payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadShape {
    /// No payload (length 0).
    Empty,
    /// Selector byte addressing one element of an array register, then one
    /// f32. Reads send `0.0` as the value.
    Indexed,
    /// Selector byte `0` followed by one f32.
    Value,
}

impl PayloadShape {
    /// Payload length in bytes.
    pub fn len(self) -> usize {
        match self {
            PayloadShape::Empty => 0,
            PayloadShape::Indexed | PayloadShape::Value => 1 + FLOAT_SIZE,
        }
    }

    pub fn is_empty(self) -> bool {
        self == PayloadShape::Empty
    }
}

/// Static description of one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub opcode: u8,
    pub name: &'static str,
    pub direction: Direction,
    pub payload: PayloadShape,
    pub reply_arity: usize,
}

impl CommandSpec {
    /// Number of reply bytes to wait for.
    pub fn reply_len(&self) -> usize {
        self.reply_arity * FLOAT_SIZE
    }
}

/// Commands understood by the module, keyed by opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum Command {
    /// Orientation quaternion (w, x, y, z).
    ReadQuat = 0x01,
    /// Roll, pitch, yaw in radians.
    ReadRpy = 0x02,
    ReadRpyVariance = 0x03,
    WriteRpyVariance = 0x04,
    /// Calibrated acceleration (x, y, z).
    ReadAcc = 0x05,
    ReadAccRaw = 0x06,
    ReadAccOffset = 0x07,
    WriteAccOffset = 0x08,
    ReadAccVariance = 0x09,
    WriteAccVariance = 0x0A,
    /// Calibrated angular rate (x, y, z).
    ReadGyro = 0x0B,
    ReadGyroRaw = 0x0C,
    ReadGyroOffset = 0x0D,
    WriteGyroOffset = 0x0E,
    ReadGyroVariance = 0x0F,
    WriteGyroVariance = 0x10,
    /// Orientation filter gain.
    SetFilterGain = 0x11,
    GetFilterGain = 0x12,
    /// Reference frame orientation is reported in (0 NWU, 1 ENU, 2 NED).
    SetFrameId = 0x13,
    GetFrameId = 0x14,
    /// Restore factory calibration and filter settings.
    ResetParams = 0x15,
    /// Drop buffered samples on the device; replies `1.0`.
    ClearDataBuffer = 0x16,
    /// Acceleration with gravity removed.
    ReadLinearAcc = 0x17,
    /// Acceleration then angular rate.
    ReadAccGyro = 0x18,
    /// Quaternion, then roll/pitch/yaw, then frame id.
    ReadOrientation = 0x19,
    /// Roll/pitch/yaw, acceleration, angular rate.
    ReadImuData = 0x1A,
}

impl Command {
    /// Every registered command, in opcode order.
    pub const ALL: [Command; 26] = [
        Command::ReadQuat,
        Command::ReadRpy,
        Command::ReadRpyVariance,
        Command::WriteRpyVariance,
        Command::ReadAcc,
        Command::ReadAccRaw,
        Command::ReadAccOffset,
        Command::WriteAccOffset,
        Command::ReadAccVariance,
        Command::WriteAccVariance,
        Command::ReadGyro,
        Command::ReadGyroRaw,
        Command::ReadGyroOffset,
        Command::WriteGyroOffset,
        Command::ReadGyroVariance,
        Command::WriteGyroVariance,
        Command::SetFilterGain,
        Command::GetFilterGain,
        Command::SetFrameId,
        Command::GetFrameId,
        Command::ResetParams,
        Command::ClearDataBuffer,
        Command::ReadLinearAcc,
        Command::ReadAccGyro,
        Command::ReadOrientation,
        Command::ReadImuData,
    ];

    /// Wire opcode.
    pub fn opcode(self) -> u8 {
        self as u8
    }

    /// Look up a command by wire opcode.
    pub fn from_opcode(opcode: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.opcode() == opcode)
    }

    /// Look up a command by its registry name (e.g. `read-rpy`).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn reply_arity(self) -> usize {
        self.spec().reply_arity
    }

    /// Registry entry for this command.
    pub fn spec(self) -> CommandSpec {
        use Direction::{Read, ReadWrite, Write};
        use PayloadShape::{Empty, Indexed, Value};

        let (name, direction, payload, reply_arity) = match self {
            Command::ReadQuat => ("read-quat", Read, Empty, 4),
            Command::ReadRpy => ("read-rpy", Read, Empty, 3),
            Command::ReadRpyVariance => ("read-rpy-variance", Read, Empty, 3),
            Command::WriteRpyVariance => ("write-rpy-variance", Write, Indexed, 0),
            Command::ReadAcc => ("read-acc", Read, Empty, 3),
            Command::ReadAccRaw => ("read-acc-raw", Read, Empty, 3),
            Command::ReadAccOffset => ("read-acc-offset", Read, Indexed, 1),
            Command::WriteAccOffset => ("write-acc-offset", Write, Indexed, 0),
            Command::ReadAccVariance => ("read-acc-variance", Read, Empty, 3),
            Command::WriteAccVariance => ("write-acc-variance", Write, Indexed, 0),
            Command::ReadGyro => ("read-gyro", Read, Empty, 3),
            Command::ReadGyroRaw => ("read-gyro-raw", Read, Empty, 3),
            Command::ReadGyroOffset => ("read-gyro-offset", Read, Indexed, 1),
            Command::WriteGyroOffset => ("write-gyro-offset", Write, Indexed, 0),
            Command::ReadGyroVariance => ("read-gyro-variance", Read, Empty, 3),
            Command::WriteGyroVariance => ("write-gyro-variance", Write, Indexed, 0),
            Command::SetFilterGain => ("set-filter-gain", Write, Value, 0),
            Command::GetFilterGain => ("get-filter-gain", Read, Empty, 1),
            Command::SetFrameId => ("set-frame-id", Write, Value, 0),
            Command::GetFrameId => ("get-frame-id", Read, Empty, 1),
            Command::ResetParams => ("reset-params", Write, Empty, 0),
            Command::ClearDataBuffer => ("clear-data-buffer", ReadWrite, Empty, 1),
            Command::ReadLinearAcc => ("read-linear-acc", Read, Empty, 3),
            Command::ReadAccGyro => ("read-acc-gyro", Read, Empty, 6),
            Command::ReadOrientation => ("read-orientation", Read, Empty, 8),
            Command::ReadImuData => ("read-imu-data", Read, Empty, 9),
        };

        CommandSpec {
            opcode: self.opcode(),
            name,
            direction,
            payload,
            reply_arity,
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.opcode())
    }
}
