//! Workspace path registry
//!
//! Persisted, ordered, duplicate-free list of every workspace directory the
//! kernel has booted into. The last entry is the most recently used one.
//! The registry lives outside any workspace (`~/.config/anchor/workspace.json`)
//! so launchers can enumerate candidates before a workspace is chosen.

use crate::error::{AnchorError, Result};
use crate::workspace::WorkspacePath;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Registry file name inside the user configuration directory
pub const REGISTRY_FILE: &str = "workspace.json";

/// Handle to the registry file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRegistry {
    path: PathBuf,
}

impl PathRegistry {
    /// Registry stored at an explicit file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Registry at the fixed per-user location under `home`
    pub fn in_home(home: &Path) -> Self {
        Self::new(user_conf_dir(home).join(REGISTRY_FILE))
    }

    /// Location of the registry file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the registry file exists (false on a first run)
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load registered workspaces
    ///
    /// An entry that is not itself a directory has stray trailing whitespace
    /// trimmed. Entries that still do not resolve to a directory are dropped, and duplicates are removed keeping the first
    /// occurrence.
    pub fn load(&self) -> Result<Vec<WorkspacePath>> {
        let data = fs::read(&self.path).map_err(|source| AnchorError::RegistryRead {
            path: self.path.clone(),
            source,
        })?;

        let raw: Vec<String> =
            serde_json::from_slice(&data).map_err(|source| AnchorError::RegistryParse {
                path: self.path.clone(),
                source,
            })?;

        let entries = raw
            .into_iter()
            .map(|raw| {
                let exact = WorkspacePath::new(&raw);
                if exact.is_dir() {
                    exact
                } else {
                    WorkspacePath::from_stored(&raw)
                }
            })
            .filter(|p| p.is_dir());
        let entries = dedup(entries);

        debug!(path = %self.path.display(), count = entries.len(), "Loaded workspace registry");
        Ok(entries)
    }

    /// Persist `entries` after removing duplicates
    ///
    /// The file is replaced atomically: the new content goes to a temporary
    /// file in the same directory which is then renamed over the registry.
    pub fn save(&self, entries: &[WorkspacePath]) -> Result<()> {
        let entries: Vec<String> = dedup(entries.iter().cloned())
            .iter()
            .filter_map(|p| match p.to_str() {
                Some(s) => Some(s.to_string()),
                None => {
                    warn!(path = %p, "skip registering a non UTF-8 workspace path");
                    None
                }
            })
            .collect();
        let data = serde_json::to_vec_pretty(&entries).map_err(AnchorError::RegistrySerialize)?;

        let write_err = |source: std::io::Error| AnchorError::RegistryWrite {
            path: self.path.clone(),
            source,
        };

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(write_err)?;

        let mut temp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
        temp.write_all(&data).map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;
        temp.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!(path = %self.path.display(), count = entries.len(), "Saved workspace registry");
        Ok(())
    }

    /// Load, append `path` as the most recent entry, and save
    ///
    /// An earlier occurrence of `path` is moved to the end so the last entry
    /// is always the most recently used workspace. A registry that cannot be
    /// loaded is treated as empty.
    ///
    /// A path that is not valid UTF-8 cannot be stored; it is logged and the
    /// registry is left untouched.
    pub fn append(&self, path: WorkspacePath) -> Result<Vec<WorkspacePath>> {
        let mut entries = if self.exists() {
            self.load().unwrap_or_default()
        } else {
            Vec::new()
        };
        if path.to_str().is_none() {
            warn!(path = %path, "workspace path is not valid UTF-8, not registering it");
            return Ok(entries);
        }
        entries.retain(|p| p != &path);
        entries.push(path);
        self.save(&entries)?;
        Ok(entries)
    }
}

/// User-global configuration directory under `home`
pub fn user_conf_dir(home: &Path) -> PathBuf {
    home.join(".config").join("anchor")
}

fn dedup(entries: impl IntoIterator<Item = WorkspacePath>) -> Vec<WorkspacePath> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn registry_in(dir: &TempDir) -> PathRegistry {
        PathRegistry::new(dir.path().join("conf").join(REGISTRY_FILE))
    }

    fn make_dir(root: &TempDir, name: &str) -> WorkspacePath {
        let path = root.path().join(name);
        fs::create_dir_all(&path).unwrap();
        WorkspacePath::new(path)
    }

    #[test]
    fn test_in_home_location() {
        let registry = PathRegistry::in_home(Path::new("/home/u"));
        assert!(registry.path().ends_with(".config/anchor/workspace.json"));
    }

    #[test]
    fn test_save_dedups_preserving_first_seen_order() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp);
        let a = make_dir(&temp, "a");
        let b = make_dir(&temp, "b");

        let entries = vec![a.clone(), b.clone(), a.clone(), b.clone(), a.clone()];
        registry.save(&entries).unwrap();
        let first = fs::read_to_string(registry.path()).unwrap();
        registry.save(&entries).unwrap();
        let second = fs::read_to_string(registry.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.load().unwrap(), vec![a, b]);
    }

    #[test]
    fn test_load_drops_missing_dirs_and_trims() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp);
        let a = make_dir(&temp, "a");
        let gone = temp.path().join("gone");

        fs::create_dir_all(registry.path().parent().unwrap()).unwrap();
        let raw = serde_json::to_string(&vec![
            format!("{} \t\n", a.key()),
            gone.to_string_lossy().into_owned(),
            a.key(),
        ])
        .unwrap();
        fs::write(registry.path(), raw).unwrap();

        assert_eq!(registry.load().unwrap(), vec![a]);
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp);
        assert!(!registry.exists());
        assert!(matches!(
            registry.load(),
            Err(AnchorError::RegistryRead { .. })
        ));
    }

    #[test]
    fn test_load_garbage_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp);
        fs::create_dir_all(registry.path().parent().unwrap()).unwrap();
        fs::write(registry.path(), "{not json").unwrap();
        assert!(matches!(
            registry.load(),
            Err(AnchorError::RegistryParse { .. })
        ));
    }

    #[test]
    fn test_append_moves_existing_entry_to_end() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp);
        let a = make_dir(&temp, "a");
        let b = make_dir(&temp, "b");

        registry.append(a.clone()).unwrap();
        registry.append(b.clone()).unwrap();
        let entries = registry.append(a.clone()).unwrap();

        assert_eq!(entries, vec![b.clone(), a.clone()]);
        assert_eq!(registry.load().unwrap(), vec![b, a]);
    }

    #[cfg(unix)]
    #[test]
    fn test_append_skips_non_utf8_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp);
        let a = make_dir(&temp, "a");
        registry.append(a.clone()).unwrap();

        let odd = temp.path().join(OsStr::from_bytes(b"ws\xFF"));
        fs::create_dir_all(&odd).unwrap();
        let entries = registry.append(WorkspacePath::new(&odd)).unwrap();

        assert_eq!(entries, vec![a.clone()]);
        assert_eq!(registry.load().unwrap(), vec![a]);
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp);
        registry.save(&[make_dir(&temp, "a")]).unwrap();

        let names: Vec<_> = fs::read_dir(registry.path().parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(REGISTRY_FILE)]);
    }
}
