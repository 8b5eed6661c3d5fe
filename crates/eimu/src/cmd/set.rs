use eimu_driver::{CommandChannel, Eimu, ReferenceFrame};
use serde_json::{json, Value};

use crate::cmd::{SetArgs, SetCommand};
use crate::exit::{driver_error, CliResult, SUCCESS, TIMEOUT};
use crate::output::{print_reading, OutputFormat};

pub fn run(args: SetArgs, format: OutputFormat) -> CliResult<i32> {
    let mut imu = args.connect.connect()?;
    let (name, value) = describe(&args.setting);
    let ok = apply(&mut imu, &args.setting)
        .map_err(|err| driver_error(&format!("set {name} failed"), err))?;
    imu.disconnect();

    print_reading(name, ok, &value, format);
    if ok {
        Ok(SUCCESS)
    } else {
        eprintln!("error: module did not acknowledge set {name}");
        Ok(TIMEOUT)
    }
}

fn apply<C: CommandChannel>(imu: &mut Eimu<C>, setting: &SetCommand) -> eimu_driver::Result<bool> {
    match setting {
        SetCommand::Gain { value } => imu.set_filter_gain(*value),
        SetCommand::Frame { frame } => imu.set_world_frame((*frame).into()),
        SetCommand::RpyVariance(args) => imu.write_rpy_variance(args.axis.into(), args.value),
        SetCommand::AccOffset(args) => imu.write_acc_offset(args.axis.into(), args.value),
        SetCommand::AccVariance(args) => imu.write_acc_variance(args.axis.into(), args.value),
        SetCommand::GyroOffset(args) => imu.write_gyro_offset(args.axis.into(), args.value),
        SetCommand::GyroVariance(args) => imu.write_gyro_variance(args.axis.into(), args.value),
        SetCommand::Reset => imu.reset_params(),
        SetCommand::ClearBuffer => imu.clear_data_buffer(),
    }
}

/// Output name and the value that was requested.
fn describe(setting: &SetCommand) -> (&'static str, Value) {
    match setting {
        SetCommand::Gain { value } => ("gain", json!(value)),
        SetCommand::Frame { frame } => {
            let frame = ReferenceFrame::from(*frame);
            ("frame", json!({ "id": frame.id(), "frame": frame }))
        }
        SetCommand::RpyVariance(args) => ("rpy-variance", axis_value(args.axis.into(), args.value)),
        SetCommand::AccOffset(args) => ("acc-offset", axis_value(args.axis.into(), args.value)),
        SetCommand::AccVariance(args) => ("acc-variance", axis_value(args.axis.into(), args.value)),
        SetCommand::GyroOffset(args) => ("gyro-offset", axis_value(args.axis.into(), args.value)),
        SetCommand::GyroVariance(args) => {
            ("gyro-variance", axis_value(args.axis.into(), args.value))
        }
        SetCommand::Reset => ("reset", Value::Null),
        SetCommand::ClearBuffer => ("clear-buffer", Value::Null),
    }
}

fn axis_value(axis: eimu_driver::Axis, value: f32) -> Value {
    json!({ "axis": axis, "value": value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{AxisArg, AxisValueArgs, FrameArg};

    #[test]
    fn describes_frame_setting() {
        let (name, value) = describe(&SetCommand::Frame {
            frame: FrameArg::Ned,
        });
        assert_eq!(name, "frame");
        assert_eq!(value, json!({ "id": 2, "frame": "ned" }));
    }

    #[test]
    fn describes_axis_setting() {
        let (name, value) = describe(&SetCommand::GyroOffset(AxisValueArgs {
            axis: AxisArg::Z,
            value: -0.5,
        }));
        assert_eq!(name, "gyro-offset");
        assert_eq!(value, json!({ "axis": "z", "value": -0.5 }));
    }
}
