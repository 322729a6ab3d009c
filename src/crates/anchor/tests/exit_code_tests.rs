//! Integration tests for the exit codes reported by the `anchor` binary

#![cfg(unix)]

mod common;

use anchor::error::{EXIT_FATAL, EXIT_INIT_WORKSPACE, EXIT_WORKSPACE_LOCKED};
use anchor::lock::WorkspaceLock;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const BOOT_VARS: [&str; 7] = [
    "ANCHOR_WORKSPACE",
    "ANCHOR_WD",
    "ANCHOR_READONLY",
    "ANCHOR_ACCESS_AUTH_CODE",
    "ANCHOR_MODE",
    "ANCHOR_ACCESS_AUTH_CODE_BYPASS",
    "ANCHOR_RUN_IN_CONTAINER",
];

fn anchor_in(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_anchor"));
    for var in BOOT_VARS {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd
}

/// Run until exit; a process still serving after the deadline is killed
fn exit_code(mut cmd: Command) -> Option<i32> {
    let mut child = cmd.spawn().expect("Failed to spawn anchor");
    let deadline = Instant::now() + Duration::from_secs(20);
    loop {
        if let Some(status) = child.try_wait().expect("Failed to poll anchor") {
            return status.code();
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            let _ = child.wait();
            return None;
        }
        thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn test_locked_workspace_exits_24() {
    let home = tempfile::TempDir::new().unwrap();
    let workspace = common::make_workspace(&home, "Shared");
    let _held = WorkspaceLock::try_acquire(&workspace).unwrap();

    let mut cmd = anchor_in(home.path());
    cmd.arg("--workspace").arg(&workspace);

    assert_eq!(exit_code(cmd), Some(EXIT_WORKSPACE_LOCKED));
}

#[test]
fn test_uncreatable_workspace_exits_25() {
    let home = tempfile::TempDir::new().unwrap();
    // The default workspace path is taken by a plain file
    fs::write(home.path().join("Anchor"), b"").unwrap();

    let mut cmd = anchor_in(home.path());
    cmd.arg("--workspace").arg(home.path().join("missing"));

    assert_eq!(exit_code(cmd), Some(EXIT_INIT_WORKSPACE));
}

#[test]
fn test_container_without_access_code_exits_1() {
    let home = tempfile::TempDir::new().unwrap();

    let mut cmd = anchor_in(home.path());
    cmd.env("ANCHOR_RUN_IN_CONTAINER", "true");

    assert_eq!(exit_code(cmd), Some(EXIT_FATAL));
    assert!(!home.path().join("Anchor").exists());
}
