//! Workspace Management
//!
//! A workspace is the user-chosen directory holding all persisted data for
//! one kernel instance. This module normalizes workspace paths, chooses the
//! workspace for a run, and derives and prepares its directory tree.

pub mod layout;
pub mod path;
pub mod resolver;

pub use layout::{is_valid_user, AppearancePaths, WorkspaceLayout, DATA_SUBDIRS, LOCK_FILE};
pub use path::WorkspacePath;
pub use resolver::{default_workspace_dir, ResolverOptions, WorkspaceResolver};
