/// Errors that can occur in driver operations.
///
/// A reply that times out or arrives short is not an error: it comes back as
/// a [`Reading`](crate::Reading) with `ok == false`.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Transport-level error (opening or configuring the link).
    #[error("transport error: {0}")]
    Transport(#[from] eimu_transport::TransportError),

    /// Frame-level error (oversized request, malformed text reply).
    #[error("frame error: {0}")]
    Frame(#[from] eimu_frame::FrameError),

    /// Host-side buffer maintenance failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A command was given arguments its payload shape cannot carry.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, DriverError>;
