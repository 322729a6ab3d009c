//! Integration tests for workspace selection and preparation

mod common;

use anchor::workspace::{default_workspace_dir, DATA_SUBDIRS};
use anchor::{PathRegistry, ResolverOptions, WorkspacePath, WorkspaceResolver};
use serial_test::serial;
use std::fs;

#[test]
fn test_empty_registry_selects_default() {
    let (home, resolver) = common::setup_resolver();
    resolver.registry().save(&[]).unwrap();

    let layout = resolver.resolve(None).unwrap();

    let default = WorkspacePath::new(default_workspace_dir(home.path()));
    assert_eq!(layout.root, default);
    assert!(default.is_dir());
    assert_eq!(common::registry_paths(resolver.registry()), vec![default]);
}

#[test]
fn test_override_wins_and_becomes_most_recent() {
    let (home, resolver) = common::setup_resolver();
    let a = WorkspacePath::new(common::make_workspace(&home, "A"));
    let b = WorkspacePath::new(common::make_workspace(&home, "B"));
    resolver.registry().save(&[a.clone()]).unwrap();

    let selected = resolver.select(Some(b.as_path())).unwrap();

    assert_eq!(selected, b);
    assert_eq!(common::registry_paths(resolver.registry()), vec![a, b]);
}

#[test]
fn test_last_entry_is_used_without_override() {
    let (home, resolver) = common::setup_resolver();
    let a = WorkspacePath::new(common::make_workspace(&home, "A"));
    let b = WorkspacePath::new(common::make_workspace(&home, "B"));
    resolver.registry().save(&[a, b.clone()]).unwrap();

    assert_eq!(resolver.select(None).unwrap(), b);
}

#[test]
fn test_reselecting_moves_entry_to_end() {
    let (home, resolver) = common::setup_resolver();
    let a = WorkspacePath::new(common::make_workspace(&home, "A"));
    let b = WorkspacePath::new(common::make_workspace(&home, "B"));
    resolver.registry().save(&[a.clone(), b.clone()]).unwrap();

    resolver.select(Some(a.as_path())).unwrap();

    assert_eq!(common::registry_paths(resolver.registry()), vec![b, a.clone()]);
    assert_eq!(resolver.select(None).unwrap(), a);
}

#[test]
fn test_vanished_entry_falls_back_to_default() {
    let (home, resolver) = common::setup_resolver();
    let gone = common::make_workspace(&home, "Gone");
    let gone_path = WorkspacePath::new(&gone);
    resolver.registry().save(&[gone_path]).unwrap();
    fs::remove_dir_all(&gone).unwrap();

    let selected = resolver.select(None).unwrap();

    assert_eq!(selected, WorkspacePath::new(default_workspace_dir(home.path())));
    assert!(selected.is_dir());
}

#[test]
fn test_missing_override_falls_back_to_default() {
    let (home, resolver) = common::setup_resolver();
    let missing = home.path().join("does-not-exist");

    let selected = resolver.select(Some(&missing)).unwrap();

    assert_eq!(selected, WorkspacePath::new(default_workspace_dir(home.path())));
    assert!(!missing.exists());
}

#[test]
fn test_override_is_normalized() {
    let (home, resolver) = common::setup_resolver();
    let dir = common::make_workspace(&home, "Notes");
    let spelled = home.path().join("Notes").join(".").join("sub").join("..");

    let selected = resolver.select(Some(&spelled)).unwrap();

    assert_eq!(selected, WorkspacePath::new(&dir));
    assert_eq!(common::registry_paths(resolver.registry()).len(), 1);
}

#[test]
fn test_registry_save_is_stable() {
    let (home, resolver) = common::setup_resolver();
    let a = WorkspacePath::new(common::make_workspace(&home, "A"));
    let b = WorkspacePath::new(common::make_workspace(&home, "B"));
    let entries = [a.clone(), b.clone(), a.clone(), b.clone(), a.clone()];

    resolver.registry().save(&entries).unwrap();
    let first = fs::read(resolver.registry().path()).unwrap();
    resolver.registry().save(&entries).unwrap();
    let second = fs::read(resolver.registry().path()).unwrap();

    assert_eq!(first, second);
    assert_eq!(common::registry_paths(resolver.registry()), vec![a, b]);
}

#[test]
fn test_resolve_prepares_tree() {
    let (_home, resolver) = common::setup_resolver();

    let layout = resolver.resolve(None).unwrap();

    for dir in [
        &layout.conf_dir,
        &layout.data_dir,
        &layout.repo_dir,
        &layout.history_dir,
        &layout.temp_dir,
        &layout.os_temp_dir,
    ] {
        assert!(dir.is_dir(), "{} missing", dir.display());
    }
    for sub in DATA_SUBDIRS {
        assert!(layout.data_dir.join(sub).is_dir());
    }
}

#[test]
fn test_registry_location_outside_workspace() {
    let (home, resolver) = common::setup_resolver();
    resolver.select(None).unwrap();

    let expected = PathRegistry::in_home(home.path());
    assert_eq!(resolver.registry(), &expected);
    assert!(expected.path().starts_with(home.path().join(".config").join("anchor")));
    assert!(expected.exists());
}

#[test]
#[serial]
fn test_prepare_publishes_temp_env() {
    let home = tempfile::TempDir::new().unwrap();
    let saved: Vec<_> = ["TMPDIR", "TEMP", "TMP"]
        .iter()
        .map(|var| (*var, std::env::var_os(var)))
        .collect();

    let resolver = WorkspaceResolver::new(ResolverOptions::from_home(home.path()));
    let layout = resolver.resolve(None).unwrap();

    for (var, _) in &saved {
        assert_eq!(
            std::env::var_os(var).as_deref(),
            Some(layout.os_temp_dir.as_os_str()),
            "{} not published",
            var
        );
    }

    for (var, value) in saved {
        match value {
            Some(v) => std::env::set_var(var, v),
            None => std::env::remove_var(var),
        }
    }
}
