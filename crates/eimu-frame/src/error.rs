/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload does not fit the one-byte length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A captured frame does not start with the sentinel byte.
    #[error("invalid start byte 0x{found:02X} (expected 0xBB)")]
    InvalidStartByte { found: u8 },

    /// A captured frame is shorter than its header and length field claim.
    #[error("truncated frame ({len} bytes, need {needed})")]
    Truncated { len: usize, needed: usize },

    /// A captured frame's trailing checksum does not match its contents.
    #[error("checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// The text protocol carries at most a fixed number of arguments.
    #[error("too many arguments for text request ({count}, max {max})")]
    TooManyArguments { count: usize, max: usize },

    /// A text reply token is not a decimal number.
    #[error("invalid number in reply: {token:?}")]
    InvalidNumber { token: String },
}

pub type Result<T> = std::result::Result<T, FrameError>;
