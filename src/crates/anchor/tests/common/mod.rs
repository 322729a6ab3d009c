//! Common test utilities and setup

#![allow(dead_code)]

use anchor::{PathRegistry, ResolverOptions, WorkspacePath, WorkspaceResolver};
use std::path::PathBuf;
use tempfile::TempDir;

/// Isolated home directory with resolver options that leave process env alone
pub fn setup_home() -> (TempDir, ResolverOptions) {
    let home = TempDir::new().expect("Failed to create temp home");
    let options = ResolverOptions::from_home(home.path()).with_publish_temp_env(false);
    (home, options)
}

/// Resolver rooted in a fresh temp home
pub fn setup_resolver() -> (TempDir, WorkspaceResolver) {
    let (home, options) = setup_home();
    (home, WorkspaceResolver::new(options))
}

/// Create an existing directory `name` under `root`
pub fn make_workspace(root: &TempDir, name: &str) -> PathBuf {
    let dir = root.path().join(name);
    std::fs::create_dir_all(&dir).expect("Failed to create workspace dir");
    dir
}

/// Registry contents as plain paths
pub fn registry_paths(registry: &PathRegistry) -> Vec<WorkspacePath> {
    registry.load().expect("Failed to load registry")
}
