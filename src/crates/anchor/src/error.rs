//! Error types for the anchor kernel
//!
//! Every error knows its [`Severity`] and the exit code a supervising
//! launcher should see. Boot code returns these errors upward; only
//! [`terminate`] turns a fatal one into a process exit.

use std::path::PathBuf;
use thiserror::Error;
use tracing::error;

/// Generic fatal exit code
pub const EXIT_FATAL: i32 = 1;

/// The workspace is held by another running instance
pub const EXIT_WORKSPACE_LOCKED: i32 = 24;

/// A required workspace directory could not be created or verified
pub const EXIT_INIT_WORKSPACE: i32 = 25;

/// Whether an error must stop the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Boot cannot continue
    Fatal,
    /// Logged, then the caller carries on
    Recoverable,
}

/// Errors that can occur in the anchor kernel
#[derive(Debug, Error)]
pub enum AnchorError {
    /// Registry file could not be read
    #[error("read workspace registry [{}] failed: {source}", .path.display())]
    RegistryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Registry file is not a JSON array of paths
    #[error("parse workspace registry [{}] failed: {source}", .path.display())]
    RegistryParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Registry file could not be written
    #[error("write workspace registry [{}] failed: {source}", .path.display())]
    RegistryWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Registry entries could not be serialized
    #[error("serialize workspace registry failed: {0}")]
    RegistrySerialize(#[source] serde_json::Error),

    /// A required directory could not be created or verified
    #[error("create directory [{}] failed: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another process holds the workspace lock
    #[error("workspace [{}] is locked by another process", .path.display())]
    AlreadyLocked { path: PathBuf },

    /// The lock marker could not be opened or locked
    #[error("lock workspace [{}] failed: {source}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Headless deployment without an access authorization code
    #[error("access authorization gate: {0}")]
    AccessGate(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnchorError {
    /// Build a directory error for `path`
    pub fn directory(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Directory {
            path: path.into(),
            source,
        }
    }

    /// Severity of this error on the boot path
    pub fn severity(&self) -> Severity {
        match self {
            Self::RegistryRead { .. }
            | Self::RegistryParse { .. }
            | Self::RegistryWrite { .. }
            | Self::RegistrySerialize(_) => Severity::Recoverable,
            Self::Directory { .. }
            | Self::AlreadyLocked { .. }
            | Self::Lock { .. }
            | Self::AccessGate(_)
            | Self::Config(_) => Severity::Fatal,
        }
    }

    /// Whether this error must stop the process
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Process exit code reported when this error terminates boot
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AlreadyLocked { .. } | Self::Lock { .. } => EXIT_WORKSPACE_LOCKED,
            Self::Directory { .. }
            | Self::RegistryRead { .. }
            | Self::RegistryParse { .. }
            | Self::RegistryWrite { .. }
            | Self::RegistrySerialize(_) => EXIT_INIT_WORKSPACE,
            Self::AccessGate(_) | Self::Config(_) => EXIT_FATAL,
        }
    }
}

/// Result type for anchor operations
pub type Result<T> = std::result::Result<T, AnchorError>;

/// Log a boot error and exit with its distinguished code
///
/// This is the only place the kernel calls `process::exit`. Recoverable
/// errors that reach it are escalated: a caller handing one over has
/// already decided boot cannot go on.
pub fn terminate(err: AnchorError) -> ! {
    let code = err.exit_code();
    error!(exit_code = code, severity = ?err.severity(), "boot failed: {}", err);
    std::process::exit(code)
}
