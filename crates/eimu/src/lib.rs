//! Host-side driver for EIMU attitude/inertial sensing modules.
//!
//! eimu talks to the module over a serial link using a small framed
//! request/reply protocol and returns orientation, acceleration, angular rate
//! and configuration values as typed readings.
//!
//! # Crate Structure
//!
//! - [`transport`]: Serial link ownership and port discovery
//! - [`frame`]: Request framing, float payload codec and the command registry
//! - [`driver`]: Request/reply dispatch and the [`Eimu`](driver::Eimu) sensor API
//!
//! ```no_run
//! use eimu::driver::{DriverConfig, Eimu, ReferenceFrame};
//! use eimu::transport::SerialConfig;
//!
//! let config = DriverConfig::new(SerialConfig::new("/dev/ttyACM0"));
//! let mut imu = Eimu::connect(&config)?;
//! imu.set_world_frame(ReferenceFrame::Enu)?;
//! let sample = imu.read_imu_data()?;
//! if sample.ok {
//!     println!("yaw {}", sample.value.rpy.yaw);
//! }
//! imu.disconnect();
//! # Ok::<(), eimu::driver::DriverError>(())
//! ```

/// Re-export transport types.
pub mod transport {
    pub use eimu_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use eimu_frame::*;
}

/// Re-export driver types.
pub mod driver {
    pub use eimu_driver::*;
}
