use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Baud rate the EIMU firmware ships with.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default bound on a single reply read.
///
/// Polling at 50 Hz needs this below 20 ms; 100 ms suits one-shot reads.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Connection parameters for a serial link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyACM0` or `COM3`.
    pub path: PathBuf,
    /// Symbol rate of the link.
    pub baud_rate: u32,
    /// Bound on each blocking read (the serial port applies it to writes too).
    pub read_timeout: Duration,
}

impl SerialConfig {
    /// Config for `path` with default baud rate and timeout.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/dev/ttyACM0"),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_firmware() {
        let cfg = SerialConfig::default();
        assert_eq!(cfg.baud_rate, 115_200);
        assert_eq!(cfg.read_timeout, Duration::from_millis(100));
    }

    #[test]
    fn builder_overrides_fields() {
        let cfg = SerialConfig::new("/dev/ttyUSB0")
            .with_baud_rate(57_600)
            .with_read_timeout(Duration::from_millis(18));
        assert_eq!(cfg.path, PathBuf::from("/dev/ttyUSB0"));
        assert_eq!(cfg.baud_rate, 57_600);
        assert_eq!(cfg.read_timeout, Duration::from_millis(18));
    }
}
