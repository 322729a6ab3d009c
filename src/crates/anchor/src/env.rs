//! Runtime environment detection
//!
//! Reads the handful of environment variables and marker files that decide
//! how the kernel is deployed.

use crate::error::{AnchorError, Result};
use std::env;
use std::path::Path;
use tracing::warn;

/// Opt-in to booting a container deployment without an access code
pub const AUTH_CODE_BYPASS_VAR: &str = "ANCHOR_ACCESS_AUTH_CODE_BYPASS";

/// Forces container mode when set to a true value
pub const RUN_IN_CONTAINER_VAR: &str = "ANCHOR_RUN_IN_CONTAINER";

/// Deployment flavour of this process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// Desktop / bare-metal install
    Std,
    /// Docker or another OCI runtime
    Docker,
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Std => write!(f, "std"),
            Self::Docker => write!(f, "docker"),
        }
    }
}

/// Environment facts captured once at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeEnv {
    pub container: Container,
    /// Whether an empty access code is accepted in a container
    pub auth_code_bypass: bool,
}

impl RuntimeEnv {
    /// Inspect the current process environment
    pub fn detect() -> Self {
        let forced = env_flag(RUN_IN_CONTAINER_VAR).unwrap_or(false);
        let container = if forced || running_in_docker() {
            Container::Docker
        } else {
            Container::Std
        };

        Self {
            container,
            auth_code_bypass: env_flag(AUTH_CODE_BYPASS_VAR).unwrap_or(false),
        }
    }

    /// Whether this process runs inside a container
    pub fn in_container(&self) -> bool {
        self.container != Container::Std
    }
}

impl Default for RuntimeEnv {
    fn default() -> Self {
        Self {
            container: Container::Std,
            auth_code_bypass: false,
        }
    }
}

/// Load an environment variable as a string
///
/// `Ok(None)` when unset; an error when set to invalid UTF-8.
pub fn get_env(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(AnchorError::Config(format!(
            "Environment variable {} contains invalid UTF-8",
            key
        ))),
    }
}

/// Load a boolean environment variable
///
/// Accepts `true/1/yes/on` and `false/0/no/off`, case-insensitively.
pub fn get_env_bool(key: &str) -> Result<Option<bool>> {
    match get_env(key)? {
        Some(val) => parse_bool(&val).map(Some).ok_or_else(|| {
            AnchorError::Config(format!("Invalid boolean value for {}: {}", key, val))
        }),
        None => Ok(None),
    }
}

/// Parse a boolean flag value
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_flag(key: &str) -> Option<bool> {
    match get_env_bool(key) {
        Ok(v) => v,
        Err(e) => {
            warn!("{}, treating as unset", e);
            None
        }
    }
}

fn running_in_docker() -> bool {
    if Path::new("/.dockerenv").exists() {
        return true;
    }
    std::fs::read_to_string("/proc/1/cgroup")
        .map(|cgroup| cgroup.contains("docker") || cgroup.contains("containerd"))
        .unwrap_or(false)
}
