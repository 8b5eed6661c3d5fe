use std::process::Command;

fn main() {
    if let Ok(target) = std::env::var("TARGET") {
        println!("cargo:rustc-env=EIMU_BUILD_TARGET={target}");
    }
    if let Ok(profile) = std::env::var("PROFILE") {
        println!("cargo:rustc-env=EIMU_BUILD_PROFILE={profile}");
    }

    // No git metadata in source tarballs.
    let hash = Command::new("git")
        .args(["rev-parse", "--short=12", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok());
    if let Some(hash) = hash {
        println!("cargo:rustc-env=EIMU_GIT_HASH={}", hash.trim());
    }

    println!("cargo:rerun-if-env-changed=TARGET");
}
