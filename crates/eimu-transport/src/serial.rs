use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, SerialPortType, StopBits};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SerialConfig;
use crate::error::{Result, TransportError};

/// An open serial connection to an EIMU module, usable as `Read + Write`.
///
/// Reads block for at most the configured read timeout and then fail with
/// `io::ErrorKind::TimedOut`.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
    path: PathBuf,
    baud_rate: u32,
}

impl SerialLink {
    /// Open the device described by `config` (8N1, no flow control).
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let path = config.path.clone();
        let port = serialport::new(path.to_string_lossy(), config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout)
            .open()
            .map_err(|source| TransportError::Open {
                path: path.clone(),
                source,
            })?;

        info!(
            ?path,
            baud_rate = config.baud_rate,
            timeout_ms = config.read_timeout.as_millis() as u64,
            "opened serial link"
        );

        Ok(Self {
            port,
            path,
            baud_rate: config.baud_rate,
        })
    }

    /// Discard bytes already received but not yet read.
    ///
    /// Stale reply bytes left over from a timed-out exchange would otherwise
    /// be consumed as the start of the next reply.
    pub fn clear_input(&mut self) -> Result<()> {
        let pending = self.port.bytes_to_read().unwrap_or(0);
        self.port.clear(ClearBuffer::Input)?;
        debug!(path = ?self.path, pending, "cleared serial input buffer");
        Ok(())
    }

    /// The device path this link was opened on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Baud rate requested at open time.
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }
}

impl Read for SerialLink {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialLink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.port.flush()
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        debug!(path = ?self.path, "closing serial link");
    }
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLink")
            .field("path", &self.path)
            .field("baud_rate", &self.baud_rate)
            .finish()
    }
}

/// A serial port visible to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortInfo {
    pub name: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}

/// Enumerate serial ports present on the host.
pub fn available_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|port| {
            let (kind, product) = match port.port_type {
                SerialPortType::UsbPort(usb) => ("usb", usb.product),
                SerialPortType::PciPort => ("pci", None),
                SerialPortType::BluetoothPort => ("bluetooth", None),
                SerialPortType::Unknown => ("unknown", None),
            };
            PortInfo {
                name: port.port_name,
                kind,
                product,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_device_reports_path() {
        let cfg = SerialConfig::new("/dev/eimu-does-not-exist");
        let err = SerialLink::open(&cfg).unwrap_err();
        match err {
            TransportError::Open { path, .. } => {
                assert_eq!(path, PathBuf::from("/dev/eimu-does-not-exist"));
            }
            other => panic!("expected open error, got {other:?}"),
        }
    }

    #[test]
    fn open_error_message_names_device() {
        let cfg = SerialConfig::new("/dev/eimu-missing-for-message");
        let err = SerialLink::open(&cfg).unwrap_err();
        assert!(err.to_string().contains("/dev/eimu-missing-for-message"));
    }
}
