//! Serial byte transport for EIMU modules.
//!
//! This is the lowest layer of eimu. It owns the serial connection and exposes
//! it as a plain `Read + Write` duplex, so every layer above stays generic over
//! the byte channel it talks through.

pub mod config;
pub mod error;
pub mod serial;

pub use config::{SerialConfig, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT};
pub use error::{Result, TransportError};
pub use serial::{available_ports, PortInfo, SerialLink};
