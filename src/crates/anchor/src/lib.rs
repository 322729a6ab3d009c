//! # Anchor - Workspace Kernel Boot
//!
//! Decides which workspace directory a kernel process serves, guarantees
//! that only one process serves it at a time, and reports boot progress to
//! anyone polling for readiness.
//!
//! ## Features
//!
//! - **Workspace Registry** - Recently used workspaces persisted in `~/.config/anchor/workspace.json`
//! - **Workspace Resolution** - Explicit override, last used, or `~/Anchor`, with fallback
//! - **Exclusivity Lock** - Advisory, non-blocking OS lock on `<workspace>/.lock`
//! - **Boot Progress** - Concurrent 0-100 progress counter with status text
//! - **Session Partitioning** - Per-workspace access code and captcha state
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use anchor::{BootArgs, BootSequencer, KernelContext, ResolverOptions, RuntimeEnv};
//! use std::sync::Arc;
//!
//! # fn example() -> anchor::Result<()> {
//! let home = dirs::home_dir().unwrap_or_default();
//! let boot = Arc::new(BootSequencer::new());
//! let ctx = KernelContext::boot(
//!     BootArgs::default(),
//!     RuntimeEnv::detect(),
//!     ResolverOptions::from_home(&home),
//!     boot.clone(),
//! )?;
//!
//! println!("serving {}", ctx.workspace());
//! boot.mark_booted();
//! ctx.close();
//! # Ok(())
//! # }
//! ```

pub mod boot;
pub mod config;
pub mod context;
pub mod env;
pub mod error;
pub mod lock;
pub mod logging;
pub mod registry;
pub mod session;
pub mod shutdown;
pub mod version;
pub mod workspace;

pub use boot::{BootProgress, BootSequencer};
pub use config::{check_access_gate, BootArgs, Mode};
pub use context::{list_workspaces, KernelContext, WorkspaceInfo};
pub use env::{Container, RuntimeEnv};
pub use error::{AnchorError, Result, Severity};
pub use lock::WorkspaceLock;
pub use registry::PathRegistry;
pub use session::{AuthFailures, SessionBinding, SessionData, WorkspaceSession};
pub use shutdown::ShutdownCoordinator;
pub use version::full_version as version_info;
pub use workspace::{ResolverOptions, WorkspaceLayout, WorkspacePath, WorkspaceResolver};
