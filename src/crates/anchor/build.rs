use std::env;
use std::process::Command;

fn main() {
    let git_commit = env::var("GIT_COMMIT").unwrap_or_else(|_| {
        Command::new("git")
            .args(["rev-parse", "--short", "HEAD"])
            .output()
            .ok()
            .filter(|output| output.status.success())
            .and_then(|output| String::from_utf8(output.stdout).ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    });
    println!("cargo:rustc-env=ANCHOR_GIT_COMMIT={}", git_commit);

    let build_time = chrono::Utc::now().to_rfc3339();
    println!("cargo:rustc-env=ANCHOR_BUILD_TIMESTAMP={}", build_time);

    println!("cargo:rerun-if-env-changed=GIT_COMMIT");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
