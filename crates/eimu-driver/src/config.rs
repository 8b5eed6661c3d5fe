use eimu_transport::SerialConfig;
use serde::{Deserialize, Serialize};

/// Longest reply line accepted from text-protocol firmware.
pub const DEFAULT_MAX_LINE_LEN: usize = 128;

/// Wire encoding spoken by the module's firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Checksummed binary frames, little-endian f32 replies.
    #[default]
    Binary,
    /// Decimal text lines.
    Text,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Binary => "binary",
            Protocol::Text => "text",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to connect a driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub serial: SerialConfig,
    pub protocol: Protocol,
    /// Text protocol only: reply lines longer than this are a failed read.
    pub max_line_len: usize,
}

impl DriverConfig {
    pub fn new(serial: SerialConfig) -> Self {
        Self {
            serial,
            ..Self::default()
        }
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            protocol: Protocol::Binary,
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn default_is_binary() {
        let cfg = DriverConfig::default();
        assert_eq!(cfg.protocol, Protocol::Binary);
        assert_eq!(cfg.max_line_len, DEFAULT_MAX_LINE_LEN);
    }

    #[test]
    fn deserializes_partial_config() {
        let cfg: DriverConfig = serde_json::from_str(
            r#"{
                "serial": { "path": "/dev/ttyUSB0", "read_timeout": { "secs": 0, "nanos": 18000000 } },
                "protocol": "text"
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.protocol, Protocol::Text);
        assert_eq!(cfg.serial.path.to_str(), Some("/dev/ttyUSB0"));
        assert_eq!(cfg.serial.baud_rate, 115_200);
        assert_eq!(cfg.serial.read_timeout, Duration::from_millis(18));
        assert_eq!(cfg.max_line_len, DEFAULT_MAX_LINE_LEN);
    }

    #[test]
    fn protocol_display() {
        assert_eq!(Protocol::Text.to_string(), "text");
        assert_eq!(
            DriverConfig::default().with_protocol(Protocol::Text).protocol,
            Protocol::Text
        );
    }
}
