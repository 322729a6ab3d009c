//! Version information
//!
//! Build metadata injected at compile time by `build.rs`. The boot
//! sequencer prefixes every status line with [`tag`].

/// Package version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (short form)
pub const GIT_COMMIT: &str = env!("ANCHOR_GIT_COMMIT");

/// Build timestamp (RFC3339 format)
pub const BUILD_TIMESTAMP: &str = env!("ANCHOR_BUILD_TIMESTAMP");

/// Version tag used in boot details, e.g. `v0.1.0`
pub fn tag() -> String {
    format!("v{}", VERSION)
}

/// Get full version information string
///
/// ```
/// use anchor::version::full_version;
///
/// println!("{}", full_version());
/// // Anchor v0.1.0 (commit abc123, built 2025-01-15T10:30:00Z)
/// ```
pub fn full_version() -> String {
    format!(
        "Anchor v{} (commit {}, built {})",
        VERSION, GIT_COMMIT, BUILD_TIMESTAMP
    )
}
