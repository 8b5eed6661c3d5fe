use eimu_driver::{Protocol, DEFAULT_MAX_LINE_LEN};
use eimu_frame::{Command, MAX_PAYLOAD};
use eimu_transport::{DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("eimu {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: eimu");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("EIMU_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "build_profile: {}",
        option_env!("EIMU_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!(
        "git_hash: {}",
        option_env!("EIMU_GIT_HASH").unwrap_or("unknown")
    );
    println!("default_protocol: {}", Protocol::default());
    println!("default_baud: {DEFAULT_BAUD_RATE}");
    println!("default_timeout_ms: {}", DEFAULT_READ_TIMEOUT.as_millis());
    println!("max_payload: {MAX_PAYLOAD}");
    println!("max_text_line: {DEFAULT_MAX_LINE_LEN}");
    println!("commands: {}", Command::ALL.len());

    Ok(SUCCESS)
}
