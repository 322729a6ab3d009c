//! Workspace directory layout
//!
//! Everything below the workspace root is derived here once per run.
//! Storage, index, and appearance subsystems read their paths from
//! [`WorkspaceLayout`] and assume the tree exists after [`WorkspaceLayout::prepare`].

use super::WorkspacePath;
use crate::config::Mode;
use crate::error::{AnchorError, Result};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Subdirectories created under every data directory
pub const DATA_SUBDIRS: [&str; 6] = ["assets", "templates", "widgets", "plugins", "emojis", "public"];

/// Environment variables pointing child processes at the scratch directory
pub const TEMP_ENV_VARS: [&str; 3] = ["TMPDIR", "TEMP", "TMP"];

/// Main index database file name
pub const DB_NAME: &str = "anchor.db";

/// Lock marker file name at the workspace root
pub const LOCK_FILE: &str = ".lock";

/// Appearance directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppearancePaths {
    /// `conf/appearance`
    pub root: PathBuf,
    /// Theme directory; follows the working directory in dev mode
    pub themes: PathBuf,
    /// Icon directory; follows the working directory in dev mode
    pub icons: PathBuf,
}

/// Paths derived from the active workspace root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    pub root: WorkspacePath,
    pub name: String,
    pub conf_dir: PathBuf,
    pub data_dir: PathBuf,
    pub repo_dir: PathBuf,
    pub history_dir: PathBuf,
    pub temp_dir: PathBuf,
    /// Scratch directory wiped on every boot
    pub os_temp_dir: PathBuf,
    pub db_path: PathBuf,
    pub history_db_path: PathBuf,
    pub asset_content_db_path: PathBuf,
    pub block_tree_db_path: PathBuf,
    pub snippets_dir: PathBuf,
    pub log_path: PathBuf,
    pub lock_path: PathBuf,
    pub appearance: AppearancePaths,
}

impl WorkspaceLayout {
    /// Derive every path for `root`
    ///
    /// Pure: nothing is touched on disk until [`prepare`](Self::prepare).
    pub fn derive(root: WorkspacePath, mode: Mode, working_dir: &Path) -> Self {
        let conf_dir = root.join("conf");
        let data_dir = root.join("data");
        let temp_dir = root.join("temp");

        let appearance_root = conf_dir.join("appearance");
        let appearance_base = match mode {
            Mode::Dev => working_dir.join("appearance"),
            Mode::Prod => appearance_root.clone(),
        };

        Self {
            name: root.name(),
            repo_dir: root.join("repo"),
            history_dir: root.join("history"),
            os_temp_dir: temp_dir.join("os"),
            db_path: temp_dir.join(DB_NAME),
            history_db_path: temp_dir.join("history.db"),
            asset_content_db_path: temp_dir.join("asset_content.db"),
            block_tree_db_path: temp_dir.join("blocktree.db"),
            snippets_dir: data_dir.join("snippets"),
            log_path: temp_dir.join("anchor.log"),
            lock_path: root.join(LOCK_FILE),
            appearance: AppearancePaths {
                root: appearance_root,
                themes: appearance_base.join("themes"),
                icons: appearance_base.join("icons"),
            },
            conf_dir,
            data_dir,
            temp_dir,
            root,
        }
    }

    /// Create the directory tree and reset scratch space
    ///
    /// `temp/os` is removed and recreated empty; `temp/repo` is removed.
    /// When `publish_temp_env` is set, `TMPDIR`, `TEMP` and `TMP` are pointed
    /// at `temp/os`. Any directory that cannot be created is a fatal
    /// [`AnchorError::Directory`].
    pub fn prepare(&self, publish_temp_env: bool) -> Result<()> {
        for dir in [
            &self.conf_dir,
            &self.data_dir,
            &self.repo_dir,
            &self.history_dir,
            &self.temp_dir,
        ] {
            ensure_dir(dir)?;
        }
        for sub in DATA_SUBDIRS {
            ensure_dir(&self.data_dir.join(sub))?;
        }

        remove_dir_if_present(&self.os_temp_dir);
        ensure_dir(&self.os_temp_dir)?;
        remove_dir_if_present(&self.temp_dir.join("repo"));

        if publish_temp_env {
            for var in TEMP_ENV_VARS {
                std::env::set_var(var, &self.os_temp_dir);
            }
            debug!(path = %self.os_temp_dir.display(), "Published scratch temp directory");
        }

        Ok(())
    }

    /// Data directory for `tenant`: the data directory name suffixed by the id
    pub fn tenant_data_dir(&self, tenant: &str) -> PathBuf {
        let mut name = OsString::from(self.data_dir.as_os_str());
        name.push(tenant);
        PathBuf::from(name)
    }

    /// Data directory for an optional tenant; the shared one when absent or empty
    pub fn data_dir_for(&self, tenant: Option<&str>) -> PathBuf {
        match tenant {
            Some(t) if is_valid_user(t) => self.tenant_data_dir(t),
            _ => self.data_dir.clone(),
        }
    }

    /// Create the data tree for `tenant`; no-op for an empty id
    pub fn init_tenant(&self, tenant: &str) -> Result<()> {
        if !is_valid_user(tenant) {
            return Ok(());
        }

        let data_dir = self.tenant_data_dir(tenant);
        ensure_dir(&data_dir)?;
        for sub in DATA_SUBDIRS {
            ensure_dir(&data_dir.join(sub))?;
        }
        debug!(tenant, path = %data_dir.display(), "Initialized tenant data directory");
        Ok(())
    }

    /// Absolute assets directory, following a symlinked `data/assets`
    pub fn assets_dir(&self) -> PathBuf {
        let assets = self.data_dir.join("assets");
        let is_link = fs::symlink_metadata(&assets)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);
        if !is_link {
            return assets;
        }
        match fs::canonicalize(&assets) {
            Ok(target) => target,
            Err(e) => {
                error!(path = %assets.display(), "read assets link failed: {}", e);
                assets
            }
        }
    }
}

/// Whether `id` names a tenant (non-empty)
pub fn is_valid_user(id: &str) -> bool {
    !id.is_empty()
}

fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    debug!("Creating directory: {}", path.display());
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(AnchorError::directory(path, e)),
    }
}

fn remove_dir_if_present(path: &Path) {
    match fs::remove_dir_all(path) {
        Ok(()) => debug!(path = %path.display(), "Removed stale directory"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "remove directory failed: {}", e),
    }
}
