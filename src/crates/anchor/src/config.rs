//! Boot configuration
//!
//! Command-line flags (each with an environment fallback) are parsed once
//! into [`BootArgs`] and frozen for the lifetime of the process.

use crate::env::{RuntimeEnv, AUTH_CODE_BYPASS_VAR};
use crate::error::{AnchorError, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, ValueEnum};
use std::path::PathBuf;
use tracing::warn;

/// Run mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Bundled assets are read from the working directory
    Dev,
    #[default]
    Prod,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dev => write!(f, "dev"),
            Self::Prod => write!(f, "prod"),
        }
    }
}

/// Kernel boot flags
#[derive(Args, Debug, Clone, Default)]
pub struct BootArgs {
    /// Dir path of the workspace, defaults to the last used one or ~/Anchor
    #[arg(long, env = "ANCHOR_WORKSPACE", value_name = "PATH")]
    pub workspace: Option<PathBuf>,

    /// Working directory holding bundled assets
    #[arg(long = "wd", env = "ANCHOR_WD", value_name = "PATH")]
    pub wd: Option<PathBuf>,

    /// Read-only mode
    #[arg(
        long,
        env = "ANCHOR_READONLY",
        value_name = "BOOL",
        default_value = "false",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub readonly: bool,

    /// Access authorization code
    #[arg(
        long = "accessAuthCode",
        env = "ANCHOR_ACCESS_AUTH_CODE",
        value_name = "CODE",
        default_value = "",
        hide_env_values = true
    )]
    pub access_auth_code: String,

    /// Run mode
    #[arg(long, env = "ANCHOR_MODE", value_enum, default_value_t = Mode::Prod)]
    pub mode: Mode,
}

impl BootArgs {
    /// Working directory: `--wd` or the process current directory
    pub fn working_dir(&self) -> PathBuf {
        match &self.wd {
            Some(wd) if !wd.as_os_str().is_empty() => wd.clone(),
            _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

/// Refuse to expose a container deployment without an access code
///
/// Passes outside containers, when a code is set, or when the bypass
/// variable explicitly opts in.
pub fn check_access_gate(args: &BootArgs, runtime: &RuntimeEnv) -> Result<()> {
    if !runtime.in_container() || !args.access_auth_code.is_empty() {
        return Ok(());
    }

    if runtime.auth_code_bypass {
        warn!(
            "bypass access auth code check since [{}] is set to [true]",
            AUTH_CODE_BYPASS_VAR
        );
        return Ok(());
    }

    Err(AnchorError::AccessGate(format!(
        "--accessAuthCode must be set when deploying in a {} container",
        runtime.container
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Container;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        boot: BootArgs,
    }

    fn docker(bypass: bool) -> RuntimeEnv {
        RuntimeEnv {
            container: Container::Docker,
            auth_code_bypass: bypass,
        }
    }

    #[test]
    fn test_parse_flags() {
        let cli = TestCli::try_parse_from([
            "anchor",
            "--workspace",
            "/data/ws",
            "--wd",
            "/opt/anchor",
            "--readonly",
            "true",
            "--accessAuthCode",
            "1234",
            "--mode",
            "dev",
        ])
        .unwrap();

        assert_eq!(cli.boot.workspace, Some(PathBuf::from("/data/ws")));
        assert_eq!(cli.boot.working_dir(), PathBuf::from("/opt/anchor"));
        assert!(cli.boot.readonly);
        assert_eq!(cli.boot.access_auth_code, "1234");
        assert_eq!(cli.boot.mode, Mode::Dev);
    }

    #[test]
    fn test_rejects_unknown_mode() {
        assert!(TestCli::try_parse_from(["anchor", "--mode", "staging"]).is_err());
    }

    #[test]
    fn test_access_gate() {
        let mut args = BootArgs::default();
        assert!(check_access_gate(&args, &RuntimeEnv::default()).is_ok());

        let err = check_access_gate(&args, &docker(false)).unwrap_err();
        assert!(matches!(err, AnchorError::AccessGate(_)));
        assert!(err.is_fatal());

        assert!(check_access_gate(&args, &docker(true)).is_ok());

        args.access_auth_code = "1234".to_string();
        assert!(check_access_gate(&args, &docker(false)).is_ok());
    }
}
