//! Kernel boot context
//!
//! [`KernelContext`] is built once per process by [`KernelContext::boot`]
//! and owns everything the rest of the kernel reads about its workspace:
//! the frozen boot flags, the derived layout, the exclusivity lock, and the
//! boot progress. Dropping the context releases the workspace.

use crate::boot::BootSequencer;
use crate::config::{check_access_gate, BootArgs};
use crate::env::RuntimeEnv;
use crate::error::Result;
use crate::lock::{self, WorkspaceLock};
use crate::logging::StageTimer;
use crate::registry::PathRegistry;
use crate::session::{AuthFailures, SessionBinding};
use crate::workspace::{ResolverOptions, WorkspaceLayout, WorkspacePath, WorkspaceResolver};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Registered workspace and whether a running instance holds it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceInfo {
    pub path: WorkspacePath,
    pub locked: bool,
}

/// List registry entries with their lock state
///
/// Missing or unreadable registries yield an empty list.
pub fn list_workspaces(registry: &PathRegistry) -> Vec<WorkspaceInfo> {
    if !registry.exists() {
        return Vec::new();
    }
    match registry.load() {
        Ok(entries) => entries
            .into_iter()
            .map(|path| {
                let locked = lock::probe(&path);
                WorkspaceInfo { path, locked }
            })
            .collect(),
        Err(e) => {
            warn!("{}", e);
            Vec::new()
        }
    }
}

/// State of a booted kernel
#[derive(Debug)]
pub struct KernelContext {
    args: BootArgs,
    runtime: RuntimeEnv,
    layout: WorkspaceLayout,
    lock: WorkspaceLock,
    registry: PathRegistry,
    boot: Arc<BootSequencer>,
    auth_failures: AuthFailures,
}

impl KernelContext {
    /// Boot the workspace stage of the kernel
    ///
    /// Checks the access gate, selects and registers the workspace, locks
    /// it, then prepares its directory tree. The lock is taken before any
    /// scratch directory is wiped. Mode and working directory in `options`
    /// are taken from `args`.
    pub fn boot(
        args: BootArgs,
        runtime: RuntimeEnv,
        options: ResolverOptions,
        boot: Arc<BootSequencer>,
    ) -> Result<Self> {
        let _stage = StageTimer::new("workspace");
        boot.advance(3, "Booting kernel...");

        info!(
            container = %runtime.container,
            mode = %args.mode,
            readonly = args.readonly,
            "Booting kernel"
        );
        check_access_gate(&args, &runtime)?;

        let options = options
            .with_mode(args.mode)
            .with_working_dir(args.working_dir());
        let registry = options.registry.clone();
        let resolver = WorkspaceResolver::new(options);

        let root = resolver.select(args.workspace.as_deref())?;
        let lock = WorkspaceLock::try_acquire(&root)?;
        let layout = resolver.prepare(root)?;
        boot.advance(2, "Initializing workspace...");

        info!(
            workspace = %layout.root,
            name = %layout.name,
            "Workspace ready"
        );
        Ok(Self {
            args,
            runtime,
            layout,
            lock,
            registry,
            boot,
            auth_failures: AuthFailures::new(),
        })
    }

    pub fn args(&self) -> &BootArgs {
        &self.args
    }

    pub fn runtime(&self) -> &RuntimeEnv {
        &self.runtime
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    /// Active workspace root
    pub fn workspace(&self) -> &WorkspacePath {
        &self.layout.root
    }

    pub fn boot_sequencer(&self) -> &Arc<BootSequencer> {
        &self.boot
    }

    pub fn registry(&self) -> &PathRegistry {
        &self.registry
    }

    pub fn auth_failures(&self) -> &AuthFailures {
        &self.auth_failures
    }

    pub fn is_readonly(&self) -> bool {
        self.args.readonly
    }

    /// Session binding for the active workspace
    pub fn session_binding(&self) -> SessionBinding {
        SessionBinding::new(&self.layout.root)
    }

    /// Registry entries with their lock state; the active one reports locked
    pub fn known_workspaces(&self) -> Vec<WorkspaceInfo> {
        list_workspaces(&self.registry)
    }

    /// Create the data tree for `tenant` and return its data directory
    pub fn init_tenant(&self, tenant: &str) -> Result<PathBuf> {
        self.layout.init_tenant(tenant)?;
        Ok(self.layout.data_dir_for(Some(tenant)))
    }

    /// Release the workspace lock
    pub fn close(self) {
        let Self { lock, layout, .. } = self;
        lock.release();
        info!(workspace = %layout.root, "Kernel closed");
    }
}
