//! Normalized workspace paths

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Absolute, lexically normalized workspace directory path
///
/// Identity is the normalized path string: two spellings of the same
/// directory (`/a/./b/`, `/a/b`) compare equal. Symlinks are not resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct WorkspacePath(PathBuf);

impl WorkspacePath {
    /// Normalize `path`, resolving it against the current directory if relative
    pub fn new(path: impl AsRef<Path>) -> Self {
        let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self::with_base(path, &base)
    }

    /// Normalize `path`, resolving it against `base` if relative
    ///
    /// The path is kept byte for byte apart from `.`/`..` resolution, so
    /// non-UTF-8 names and trailing whitespace survive.
    pub fn with_base(path: impl AsRef<Path>, base: &Path) -> Self {
        let path = path.as_ref();
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        };
        Self(lexical_normalize(&joined))
    }

    /// Parse a stored registry entry, dropping stray trailing whitespace
    pub fn from_stored(raw: &str) -> Self {
        Self::new(raw.trim_end_matches([' ', '\t', '\r', '\n']))
    }

    /// Path as UTF-8, when it is representable in the registry
    pub fn to_str(&self) -> Option<&str> {
        self.0.to_str()
    }

    /// Borrow as a filesystem path
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Whether the path currently resolves to a directory
    pub fn is_dir(&self) -> bool {
        self.0.is_dir()
    }

    /// Final path component, used as the workspace display name
    pub fn name(&self) -> String {
        self.0
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Join a child path
    pub fn join(&self, child: impl AsRef<Path>) -> PathBuf {
        self.0.join(child)
    }

    /// Normalized string identity
    pub fn key(&self) -> String {
        self.0.to_string_lossy().into_owned()
    }
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root or a drive prefix
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

impl AsRef<Path> for WorkspacePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for WorkspacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<WorkspacePath> for String {
    fn from(path: WorkspacePath) -> Self {
        path.key()
    }
}

impl From<String> for WorkspacePath {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<WorkspacePath> for PathBuf {
    fn from(path: WorkspacePath) -> Self {
        path.0
    }
}
