//! Workspace exclusivity lock
//!
//! An advisory OS lock on `<workspace>/.lock` keeps two kernel instances
//! from attaching to the same workspace. It does not stop unrelated
//! processes from touching the directory. Acquisition never waits: a
//! contended workspace is a configuration problem, not a transient one.

use crate::error::{AnchorError, Result};
use crate::workspace::LOCK_FILE;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Held workspace lock
///
/// Only obtainable through [`WorkspaceLock::try_acquire`]. The lock is
/// released by [`release`](Self::release) or, failing that, on drop.
#[derive(Debug)]
pub struct WorkspaceLock {
    file: Option<File>,
    marker: PathBuf,
    workspace: PathBuf,
}

impl WorkspaceLock {
    /// Lock `workspace` without blocking
    ///
    /// Fails with [`AnchorError::AlreadyLocked`] when another holder exists
    /// and [`AnchorError::Lock`] when the marker cannot be opened or locked.
    pub fn try_acquire(workspace: impl AsRef<Path>) -> Result<Self> {
        let workspace = workspace.as_ref().to_path_buf();
        let marker = workspace.join(LOCK_FILE);

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&marker)
            .map_err(|source| AnchorError::Lock {
                path: workspace.clone(),
                source,
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                info!(workspace = %workspace.display(), "Locked workspace");
                Ok(Self {
                    file: Some(file),
                    marker,
                    workspace,
                })
            }
            Err(e) if is_contended(&e) => Err(AnchorError::AlreadyLocked { path: workspace }),
            Err(source) => Err(AnchorError::Lock {
                path: workspace,
                source,
            }),
        }
    }

    /// Workspace this lock guards
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Release the OS lock and delete the marker file
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        let Some(file) = self.file.take() else {
            return;
        };

        if let Err(e) = file.unlock() {
            error!(workspace = %self.workspace.display(), "unlock workspace failed: {}", e);
            return;
        }
        drop(file);

        // A leftover marker does not block the next acquire
        if let Err(e) = fs::remove_file(&self.marker) {
            error!(path = %self.marker.display(), "remove workspace lock failed: {}", e);
            return;
        }
        info!(workspace = %self.workspace.display(), "Unlocked workspace");
    }
}

impl Drop for WorkspaceLock {
    fn drop(&mut self) {
        self.release_inner();
    }
}

/// Whether another holder currently locks `workspace`
///
/// Never creates a marker and never leaves a lock behind, so it is safe to
/// call against a workspace a running instance owns.
pub fn probe(workspace: impl AsRef<Path>) -> bool {
    let workspace = workspace.as_ref();
    if !workspace.is_dir() {
        return false;
    }

    let marker = workspace.join(LOCK_FILE);
    if !marker.exists() {
        return false;
    }

    let file = match OpenOptions::new().read(true).open(&marker) {
        Ok(f) => f,
        Err(e) => {
            debug!(path = %marker.display(), "open lock marker failed: {}", e);
            return true;
        }
    };

    match file.try_lock_exclusive() {
        Ok(()) => {
            if let Err(e) = file.unlock() {
                error!(path = %marker.display(), "unlock probe failed: {}", e);
            }
            false
        }
        Err(_) => true,
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
