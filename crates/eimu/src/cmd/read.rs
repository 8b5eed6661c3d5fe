use eimu_driver::{Axis, CommandChannel, Eimu, Reading, Vector3};
use serde::Serialize;
use serde_json::{json, Value};

use crate::cmd::{ReadArgs, ReadTarget};
use crate::exit::{driver_error, CliError, CliResult, INTERNAL, SUCCESS, TIMEOUT};
use crate::output::{print_reading, OutputFormat};

pub fn run(args: ReadArgs, format: OutputFormat) -> CliResult<i32> {
    let mut imu = args.connect.connect()?;
    let (ok, value) = read_target(&mut imu, args.target)?;
    imu.disconnect();

    print_reading(args.target.name(), ok, &value, format);
    if ok {
        Ok(SUCCESS)
    } else {
        eprintln!("error: no reply to {} read", args.target.name());
        Ok(TIMEOUT)
    }
}

/// Perform one read and return its success flag with the value as JSON.
pub fn read_target<C: CommandChannel>(
    imu: &mut Eimu<C>,
    target: ReadTarget,
) -> CliResult<(bool, Value)> {
    let context = format!("{} read failed", target.name());
    let fail = |err| driver_error(&context, err);

    match target {
        ReadTarget::Quat => to_json(imu.read_quat().map_err(fail)?),
        ReadTarget::Rpy => to_json(imu.read_rpy().map_err(fail)?),
        ReadTarget::RpyVariance => to_json(imu.read_rpy_variance().map_err(fail)?),
        ReadTarget::Acc => to_json(imu.read_acc().map_err(fail)?),
        ReadTarget::AccRaw => to_json(imu.read_acc_raw().map_err(fail)?),
        ReadTarget::AccVariance => to_json(imu.read_acc_variance().map_err(fail)?),
        ReadTarget::LinearAcc => to_json(imu.read_linear_acc().map_err(fail)?),
        ReadTarget::Gyro => to_json(imu.read_gyro().map_err(fail)?),
        ReadTarget::GyroRaw => to_json(imu.read_gyro_raw().map_err(fail)?),
        ReadTarget::GyroVariance => to_json(imu.read_gyro_variance().map_err(fail)?),
        ReadTarget::AccOffset => {
            let reading = per_axis(|axis| imu.read_acc_offset(axis)).map_err(fail)?;
            to_json(reading)
        }
        ReadTarget::GyroOffset => {
            let reading = per_axis(|axis| imu.read_gyro_offset(axis)).map_err(fail)?;
            to_json(reading)
        }
        ReadTarget::AccGyro => to_json(imu.read_acc_gyro().map_err(fail)?),
        ReadTarget::Orientation => to_json(imu.read_orientation().map_err(fail)?),
        ReadTarget::Imu => to_json(imu.read_imu_data().map_err(fail)?),
        ReadTarget::Gain => to_json(imu.get_filter_gain().map_err(fail)?),
        ReadTarget::Frame => {
            let reading = imu.get_world_frame_id().map_err(fail)?;
            let frame = eimu_driver::ReferenceFrame::from_id(reading.value);
            Ok((
                reading.ok,
                json!({
                    "id": reading.value,
                    "frame": frame,
                    "name": frame.map(|f| f.name()),
                }),
            ))
        }
    }
}

/// Read the three elements of an array register into one vector.
fn per_axis(
    mut read: impl FnMut(Axis) -> eimu_driver::Result<Reading<f64>>,
) -> eimu_driver::Result<Reading<Vector3>> {
    let x = read(Axis::X)?;
    let y = read(Axis::Y)?;
    let z = read(Axis::Z)?;
    Ok(Reading {
        ok: x.ok && y.ok && z.ok,
        value: Vector3 {
            x: x.value,
            y: y.value,
            z: z.value,
        },
    })
}

fn to_json<T: Serialize>(reading: Reading<T>) -> CliResult<(bool, Value)> {
    let value = serde_json::to_value(&reading.value)
        .map_err(|err| CliError::new(INTERNAL, format!("failed to encode reading: {err}")))?;
    Ok((reading.ok, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_axis_combines_flags() {
        let mut calls = Vec::new();
        let reading = per_axis(|axis| {
            calls.push(axis);
            Ok(Reading {
                ok: axis != Axis::Y,
                value: f64::from(axis.selector()),
            })
        })
        .unwrap();
        assert_eq!(calls, Axis::ALL.to_vec());
        assert!(!reading.ok);
        assert_eq!(reading.value.as_array(), [0.0, 1.0, 2.0]);
    }

    #[test]
    fn readings_encode_as_objects() {
        let (ok, value) = to_json(Reading {
            ok: true,
            value: Vector3 {
                x: 1.0,
                y: 0.0,
                z: -9.81,
            },
        })
        .unwrap();
        assert!(ok);
        assert_eq!(value, json!({"x": 1.0, "y": 0.0, "z": -9.81}));
    }
}
