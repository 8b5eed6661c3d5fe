#![cfg(feature = "cli")]

use std::process::Command;

fn eimu() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_eimu"));
    command
        .arg("--log-level")
        .arg("error")
        .env_remove("EIMU_PORT")
        .env_remove("EIMU_BAUD")
        .env_remove("EIMU_LOG");
    command
}

#[test]
fn version_prints_package_version() {
    let output = eimu().arg("version").output().expect("version should run");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf8");
    assert_eq!(stdout.trim(), format!("eimu {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn log_level_is_read_from_environment() {
    let output = Command::new(env!("CARGO_BIN_EXE_eimu"))
        .env("EIMU_LOG", "loud")
        .arg("version")
        .output()
        .expect("version should run");
    assert!(!output.status.success());

    let stderr = String::from_utf8(output.stderr).expect("stderr should be utf8");
    assert!(stderr.contains("loud"));
}

#[test]
fn commands_lists_full_registry_as_json() {
    let output = eimu()
        .args(["--format", "json", "commands"])
        .output()
        .expect("commands should run");
    assert!(output.status.success());

    let specs: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid json");
    let specs = specs.as_array().expect("registry should be an array");
    assert_eq!(specs.len(), 26);
    assert_eq!(specs[1]["name"], "read-rpy");
    assert_eq!(specs[1]["opcode"], 2);
    assert_eq!(specs[1]["reply_arity"], 3);
}

#[test]
fn frame_prints_request_bytes_without_device() {
    let output = eimu()
        .args(["--format", "json", "frame", "read-rpy"])
        .output()
        .expect("frame should run");
    assert!(output.status.success());

    let out: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid json");
    assert_eq!(out["bytes"], "BB 02 00 BD");
    assert_eq!(out["reply_bytes"], 12);
}

#[test]
fn frame_rejects_unknown_command() {
    let output = eimu()
        .args(["frame", "read-everything"])
        .output()
        .expect("frame should run");
    assert_eq!(output.status.code(), Some(64));

    let stderr = String::from_utf8(output.stderr).expect("stderr should be utf8");
    assert!(stderr.contains("unknown command"));
}

#[test]
fn read_against_missing_port_fails() {
    let output = eimu()
        .args(["read", "rpy", "--port", "/dev/eimu-cli-missing-port"])
        .output()
        .expect("read should run");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).expect("stderr should be utf8");
    assert!(stderr.contains("connect failed"));
    assert!(stderr.contains("/dev/eimu-cli-missing-port"));
}
