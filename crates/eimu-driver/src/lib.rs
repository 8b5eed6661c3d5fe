//! Blocking request/reply driver for EIMU modules.
//!
//! This is the layer applications talk to. [`Eimu`] exposes named sensor
//! operations; underneath, a [`CommandChannel`] turns each one into a single
//! request and a single reply over the configured wire encoding, and the
//! [`Dispatcher`] owns the byte transport for the lifetime of the driver.

pub mod channel;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod imu;
pub mod reading;

#[cfg(test)]
pub(crate) mod testing;

pub use channel::{request_values, AnyChannel, BinaryChannel, CommandChannel, TextChannel};
pub use config::{DriverConfig, Protocol, DEFAULT_MAX_LINE_LEN};
pub use dispatcher::{Dispatcher, Exchange, Reply, Transport};
pub use error::{DriverError, Result};
pub use imu::Eimu;
pub use reading::{
    AccGyro, Axis, ImuSample, Orientation, Quaternion, Reading, ReferenceFrame, Rpy, Vector3,
};
