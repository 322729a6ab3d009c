//! Workspace resolution
//!
//! Picks the workspace for this run. Priority, lowest to highest:
//! 1. The platform default (`~/Anchor`)
//! 2. The most recently used registry entry
//! 3. An explicit `--workspace` override
//!
//! A chosen directory that does not exist falls back to the default, which
//! is created on demand. Boot never fails just because a remembered
//! workspace was removed.

use super::{WorkspaceLayout, WorkspacePath};
use crate::config::Mode;
use crate::error::{AnchorError, Result};
use crate::registry::PathRegistry;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the default workspace directory under the home directory
pub const DEFAULT_WORKSPACE_NAME: &str = "Anchor";

/// Default workspace directory for `home`
///
/// On Windows `%USERPROFILE%` takes precedence over `home` when set.
pub fn default_workspace_dir(home: &Path) -> PathBuf {
    if cfg!(windows) {
        if let Some(profile) = std::env::var_os("USERPROFILE").filter(|p| !p.is_empty()) {
            return PathBuf::from(profile).join(DEFAULT_WORKSPACE_NAME);
        }
    }
    home.join(DEFAULT_WORKSPACE_NAME)
}

/// Inputs to workspace resolution
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Registry of previously used workspaces
    pub registry: PathRegistry,
    /// Fallback workspace directory
    pub default_dir: PathBuf,
    /// Run mode, selects appearance paths
    pub mode: Mode,
    /// Working directory holding bundled assets
    pub working_dir: PathBuf,
    /// Whether to point the temp-directory env vars at the scratch directory
    pub publish_temp_env: bool,
}

impl ResolverOptions {
    /// Options rooted at `home`: registry under `~/.config/anchor`, default `~/Anchor`
    pub fn from_home(home: &Path) -> Self {
        Self {
            registry: PathRegistry::in_home(home),
            default_dir: default_workspace_dir(home),
            mode: Mode::Prod,
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            publish_temp_env: true,
        }
    }

    /// Set run mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set working directory
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Set whether the temp env vars are published
    pub fn with_publish_temp_env(mut self, publish: bool) -> Self {
        self.publish_temp_env = publish;
        self
    }
}

/// Resolves and prepares the active workspace
pub struct WorkspaceResolver {
    options: ResolverOptions,
}

impl WorkspaceResolver {
    /// Create a new resolver
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    /// Registry used by this resolver
    pub fn registry(&self) -> &PathRegistry {
        &self.options.registry
    }

    /// Resolve, register, and prepare the workspace in one step
    pub fn resolve(&self, explicit: Option<&Path>) -> Result<WorkspaceLayout> {
        let root = self.select(explicit)?;
        self.prepare(root)
    }

    /// Choose the workspace directory and record it in the registry
    ///
    /// Does not touch anything inside the workspace, so callers can take
    /// the exclusivity lock before [`WorkspaceLayout::prepare`] resets
    /// scratch space.
    pub fn select(&self, explicit: Option<&Path>) -> Result<WorkspacePath> {
        let registry = &self.options.registry;
        let default = WorkspacePath::new(&self.options.default_dir);

        let first_run = !registry.exists();
        let mut target = if first_run {
            if let Some(conf_dir) = registry.path().parent() {
                create_dir(conf_dir)?;
            }
            debug!(registry = %registry.path().display(), "No workspace registry, first run");
            default.clone()
        } else {
            match registry.load() {
                Ok(entries) => entries.last().cloned().unwrap_or_else(|| default.clone()),
                Err(e) => {
                    warn!("{}, falling back to the default workspace", e);
                    default.clone()
                }
            }
        };

        if let Some(path) = explicit.filter(|p| !p.as_os_str().is_empty()) {
            target = WorkspacePath::new(path);
        }

        if !target.is_dir() {
            warn!(
                "use the default workspace [{}] since the specified workspace [{}] is not a dir",
                default, target
            );
            create_dir(default.as_path())?;
            target = default;
        }

        if let Err(e) = registry.append(target.clone()) {
            warn!("{}, continuing with an unpersisted registry", e);
        }

        info!(workspace = %target, "Selected workspace");
        Ok(target)
    }

    /// Derive the layout for `root` with this resolver's mode and working directory
    pub fn layout_for(&self, root: WorkspacePath) -> WorkspaceLayout {
        WorkspaceLayout::derive(root, self.options.mode, &self.options.working_dir)
    }

    /// Derive the layout for `root` and create its directory tree
    pub fn prepare(&self, root: WorkspacePath) -> Result<WorkspaceLayout> {
        let layout = self.layout_for(root);
        layout.prepare(self.options.publish_temp_env)?;
        Ok(layout)
    }
}

fn create_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| AnchorError::directory(path, e))
}
