use eimu_frame::{Command, FloatReply};
use eimu_transport::SerialLink;
use tracing::{debug, info, warn};

use crate::channel::{AnyChannel, CommandChannel};
use crate::config::DriverConfig;
use crate::error::{DriverError, Result};
use crate::reading::{
    frame_id_from, round_to, AccGyro, Axis, ImuSample, Orientation, Quaternion, Reading,
    ReferenceFrame, Rpy, Vector3, GAIN_DIGITS, VECTOR_DIGITS,
};

/// Driver for one EIMU module.
///
/// Every operation is one blocking request and one reply bounded by the
/// transport's read timeout. Calls take `&mut self`; to share a driver between
/// threads, wrap it in a `Mutex` so replies cannot interleave.
pub struct Eimu<C = AnyChannel<SerialLink>> {
    channel: C,
}

impl Eimu<AnyChannel<SerialLink>> {
    /// Open the serial link described by `config` and speak its protocol.
    pub fn connect(config: &DriverConfig) -> Result<Self> {
        let link = SerialLink::open(&config.serial)?;
        info!(
            path = ?config.serial.path,
            protocol = %config.protocol,
            "connected to eimu"
        );
        Ok(Self::new(AnyChannel::with_max_line_len(
            config.protocol,
            link,
            config.max_line_len,
        )))
    }

    /// Release the serial link.
    pub fn disconnect(self) {
        let link = self.channel.into_inner();
        info!(path = ?link.path(), "disconnected from eimu");
    }
}

impl<C: CommandChannel> Eimu<C> {
    /// Wrap an already constructed channel.
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn into_inner(self) -> C {
        self.channel
    }

    fn read(&mut self, command: Command) -> Result<FloatReply> {
        self.channel.request(command, None, &[])
    }

    fn read_indexed(&mut self, command: Command, axis: Axis) -> Result<Reading<f64>> {
        let reply = self.channel.request(command, Some(axis.selector()), &[])?;
        Ok(Reading::from_reply(&reply, |r| round_to(r.value(0), VECTOR_DIGITS)))
    }

    fn read_vector(&mut self, command: Command) -> Result<Reading<Vector3>> {
        let reply = self.read(command)?;
        Ok(Reading::from_reply(&reply, |r| Vector3::from_reply(r, 0)))
    }

    fn write(&mut self, command: Command, selector: Option<u8>, value: f32) -> Result<bool> {
        let reply = self.channel.request(command, selector, &[value])?;
        debug!(%command, ok = reply.ok, "write");
        Ok(reply.ok)
    }

    /// Orientation quaternion (w, x, y, z).
    pub fn read_quat(&mut self) -> Result<Reading<Quaternion>> {
        let reply = self.read(Command::ReadQuat)?;
        Ok(Reading::from_reply(&reply, |r| Quaternion::from_reply(r, 0)))
    }

    /// Roll, pitch and yaw in radians.
    pub fn read_rpy(&mut self) -> Result<Reading<Rpy>> {
        let reply = self.read(Command::ReadRpy)?;
        Ok(Reading::from_reply(&reply, |r| Rpy::from_reply(r, 0)))
    }

    pub fn read_rpy_variance(&mut self) -> Result<Reading<Rpy>> {
        let reply = self.read(Command::ReadRpyVariance)?;
        Ok(Reading::from_reply(&reply, |r| Rpy::from_reply(r, 0)))
    }

    /// Calibrated acceleration.
    pub fn read_acc(&mut self) -> Result<Reading<Vector3>> {
        self.read_vector(Command::ReadAcc)
    }

    pub fn read_acc_raw(&mut self) -> Result<Reading<Vector3>> {
        self.read_vector(Command::ReadAccRaw)
    }

    pub fn read_acc_variance(&mut self) -> Result<Reading<Vector3>> {
        self.read_vector(Command::ReadAccVariance)
    }

    /// Acceleration with gravity removed.
    pub fn read_linear_acc(&mut self) -> Result<Reading<Vector3>> {
        self.read_vector(Command::ReadLinearAcc)
    }

    /// Calibrated angular rate.
    pub fn read_gyro(&mut self) -> Result<Reading<Vector3>> {
        self.read_vector(Command::ReadGyro)
    }

    pub fn read_gyro_raw(&mut self) -> Result<Reading<Vector3>> {
        self.read_vector(Command::ReadGyroRaw)
    }

    pub fn read_gyro_variance(&mut self) -> Result<Reading<Vector3>> {
        self.read_vector(Command::ReadGyroVariance)
    }

    pub fn read_acc_offset(&mut self, axis: Axis) -> Result<Reading<f64>> {
        self.read_indexed(Command::ReadAccOffset, axis)
    }

    pub fn read_gyro_offset(&mut self, axis: Axis) -> Result<Reading<f64>> {
        self.read_indexed(Command::ReadGyroOffset, axis)
    }

    /// Acceleration and angular rate in one exchange.
    pub fn read_acc_gyro(&mut self) -> Result<Reading<AccGyro>> {
        let reply = self.read(Command::ReadAccGyro)?;
        Ok(Reading::from_reply(&reply, |r| AccGyro {
            acc: Vector3::from_reply(r, 0),
            gyro: Vector3::from_reply(r, 3),
        }))
    }

    /// Quaternion, Euler angles and reference frame id in one exchange.
    pub fn read_orientation(&mut self) -> Result<Reading<Orientation>> {
        let reply = self.read(Command::ReadOrientation)?;
        Ok(Reading::from_reply(&reply, |r| Orientation {
            quat: Quaternion::from_reply(r, 0),
            rpy: Rpy::from_reply(r, 4),
            frame_id: frame_id_from(r.value(7)),
        }))
    }

    /// Euler angles, acceleration and angular rate in one exchange.
    pub fn read_imu_data(&mut self) -> Result<Reading<ImuSample>> {
        let reply = self.read(Command::ReadImuData)?;
        Ok(Reading::from_reply(&reply, |r| ImuSample {
            rpy: Rpy::from_reply(r, 0),
            acc: Vector3::from_reply(r, 3),
            gyro: Vector3::from_reply(r, 6),
        }))
    }

    /// Orientation filter gain, to three decimals.
    pub fn get_filter_gain(&mut self) -> Result<Reading<f64>> {
        let reply = self.read(Command::GetFilterGain)?;
        Ok(Reading::from_reply(&reply, |r| round_to(r.value(0), GAIN_DIGITS)))
    }

    pub fn set_filter_gain(&mut self, gain: f32) -> Result<bool> {
        self.write(Command::SetFilterGain, None, gain)
    }

    /// Raw reference frame id as reported by the module.
    pub fn get_world_frame_id(&mut self) -> Result<Reading<u8>> {
        let reply = self.read(Command::GetFrameId)?;
        Ok(Reading::from_reply(&reply, |r| frame_id_from(r.value(0))))
    }

    /// Reference frame, or `None` for an id this driver does not know.
    pub fn get_world_frame(&mut self) -> Result<Reading<Option<ReferenceFrame>>> {
        Ok(self.get_world_frame_id()?.map(ReferenceFrame::from_id))
    }

    pub fn set_world_frame(&mut self, frame: ReferenceFrame) -> Result<bool> {
        self.write(Command::SetFrameId, None, f32::from(frame.id()))
    }

    /// Set the reference frame by id (0 NWU, 1 ENU, 2 NED).
    pub fn set_world_frame_id(&mut self, id: u8) -> Result<bool> {
        let frame = ReferenceFrame::from_id(id).ok_or_else(|| {
            DriverError::InvalidArgument(format!("unknown reference frame id {id}"))
        })?;
        self.set_world_frame(frame)
    }

    pub fn write_rpy_variance(&mut self, axis: Axis, variance: f32) -> Result<bool> {
        self.write(Command::WriteRpyVariance, Some(axis.selector()), variance)
    }

    pub fn write_acc_offset(&mut self, axis: Axis, offset: f32) -> Result<bool> {
        self.write(Command::WriteAccOffset, Some(axis.selector()), offset)
    }

    pub fn write_acc_variance(&mut self, axis: Axis, variance: f32) -> Result<bool> {
        self.write(Command::WriteAccVariance, Some(axis.selector()), variance)
    }

    pub fn write_gyro_offset(&mut self, axis: Axis, offset: f32) -> Result<bool> {
        self.write(Command::WriteGyroOffset, Some(axis.selector()), offset)
    }

    pub fn write_gyro_variance(&mut self, axis: Axis, variance: f32) -> Result<bool> {
        self.write(Command::WriteGyroVariance, Some(axis.selector()), variance)
    }

    /// Restore factory calibration and filter settings.
    pub fn reset_params(&mut self) -> Result<bool> {
        let reply = self.read(Command::ResetParams)?;
        Ok(reply.ok)
    }

    /// Drop stale samples on both ends of the link.
    ///
    /// Host-side input is discarded first so a late reply from an earlier,
    /// timed-out exchange cannot be read as this command's answer.
    /// A transport that cannot discard its input reports `false` like any
    /// other transport fault.
    pub fn clear_data_buffer(&mut self) -> Result<bool> {
        if let Err(err) = self.channel.discard_input() {
            warn!(error = %err, "host input discard failed; reporting failed clear");
            return Ok(false);
        }
        let reply = self.read(Command::ClearDataBuffer)?;
        Ok(reply.ok && reply.value(0) == 1.0)
    }
}
