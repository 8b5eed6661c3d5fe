//! Typed sensor values returned by [`Eimu`](crate::Eimu).

use eimu_frame::FloatReply;
use serde::{Deserialize, Serialize};

/// A value read from the module together with its success flag.
///
/// When `ok` is false the value is built from zeros, so it can always be
/// destructured the same way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading<T> {
    pub ok: bool,
    pub value: T,
}

impl<T> Reading<T> {
    /// Build a reading from a decoded reply.
    pub(crate) fn from_reply(reply: &FloatReply, convert: impl FnOnce(&FloatReply) -> T) -> Self {
        Self {
            ok: reply.ok,
            value: convert(reply),
        }
    }

    /// The value, if the read succeeded.
    pub fn ok(self) -> Option<T> {
        self.ok.then_some(self.value)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reading<U> {
        Reading {
            ok: self.ok,
            value: f(self.value),
        }
    }
}

/// Round to `digits` decimal places, widening to f64 first.
pub(crate) fn round_to(value: f32, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (f64::from(value) * scale).round() / scale
}

/// Angle and vector precision.
pub(crate) const VECTOR_DIGITS: i32 = 6;

/// Filter gain precision.
pub(crate) const GAIN_DIGITS: i32 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub(crate) fn from_reply(reply: &FloatReply, offset: usize) -> Self {
        Self {
            x: round_to(reply.value(offset), VECTOR_DIGITS),
            y: round_to(reply.value(offset + 1), VECTOR_DIGITS),
            z: round_to(reply.value(offset + 2), VECTOR_DIGITS),
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Euler angles in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rpy {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Rpy {
    pub(crate) fn from_reply(reply: &FloatReply, offset: usize) -> Self {
        Self {
            roll: round_to(reply.value(offset), VECTOR_DIGITS),
            pitch: round_to(reply.value(offset + 1), VECTOR_DIGITS),
            yaw: round_to(reply.value(offset + 2), VECTOR_DIGITS),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub(crate) fn from_reply(reply: &FloatReply, offset: usize) -> Self {
        Self {
            w: round_to(reply.value(offset), VECTOR_DIGITS),
            x: round_to(reply.value(offset + 1), VECTOR_DIGITS),
            y: round_to(reply.value(offset + 2), VECTOR_DIGITS),
            z: round_to(reply.value(offset + 3), VECTOR_DIGITS),
        }
    }
}

/// Acceleration and angular rate from one compound read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccGyro {
    pub acc: Vector3,
    pub gyro: Vector3,
}

/// Quaternion, Euler angles and the reference frame they are expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub quat: Quaternion,
    pub rpy: Rpy,
    pub frame_id: u8,
}

/// Orientation, acceleration and angular rate from one compound read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImuSample {
    pub rpy: Rpy,
    pub acc: Vector3,
    pub gyro: Vector3,
}

/// Coordinate convention applied to orientation output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ReferenceFrame {
    /// North-West-Up.
    Nwu = 0,
    /// East-North-Up.
    Enu = 1,
    /// North-East-Down.
    Ned = 2,
}

impl ReferenceFrame {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(ReferenceFrame::Nwu),
            1 => Some(ReferenceFrame::Enu),
            2 => Some(ReferenceFrame::Ned),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ReferenceFrame::Nwu => "North-West-Up (NWU)",
            ReferenceFrame::Enu => "East-North-Up (ENU)",
            ReferenceFrame::Ned => "North-East-Down (NED)",
        }
    }
}

impl std::fmt::Display for ReferenceFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Frame ids travel as floats; take the nearest integer.
pub(crate) fn frame_id_from(value: f32) -> u8 {
    f64::from(value).round().clamp(0.0, f64::from(u8::MAX)) as u8
}

/// Element of a three-axis array register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Selector byte addressing this axis.
    pub fn selector(self) -> u8 {
        self as u8
    }
}
