//! Per-workspace session state
//!
//! A session (owned by the HTTP layer, which also handles its expiry) may
//! visit several locally served workspaces. Its access code and captcha
//! state are kept per workspace path so credentials never leak from one
//! workspace to another.

use crate::workspace::WorkspacePath;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, warn};

/// Failed authorizations tolerated before a captcha is required
pub const CAPTCHA_THRESHOLD: u32 = 3;

/// Credential state of one session inside one workspace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WorkspaceSession {
    pub access_auth_code: String,
    pub captcha: String,
}

impl WorkspaceSession {
    /// Whether this entry satisfies the configured access code
    ///
    /// An empty configured code means the workspace is open.
    pub fn is_authorized(&self, configured_code: &str) -> bool {
        configured_code.is_empty() || self.access_auth_code == configured_code
    }
}

/// Session payload: workspace path to credential state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SessionData {
    pub workspaces: HashMap<String, WorkspaceSession>,
}

impl SessionData {
    /// Decode a stored session, degrading to an empty one
    pub fn from_json(data: &str) -> Self {
        match serde_json::from_str(data) {
            Ok(session) => session,
            Err(e) => {
                warn!("decode session failed, starting fresh: {}", e);
                Self::default()
            }
        }
    }

    /// Encode for storage in the session backend
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Binds sessions to the workspace served by this process
#[derive(Debug, Clone)]
pub struct SessionBinding {
    workspace: String,
}

impl SessionBinding {
    /// Binding for the active workspace
    pub fn new(workspace: &WorkspacePath) -> Self {
        Self {
            workspace: workspace.key(),
        }
    }

    /// Key used inside [`SessionData::workspaces`]
    pub fn workspace_key(&self) -> &str {
        &self.workspace
    }

    /// Entry for the active workspace, created empty if missing
    pub fn get_or_create<'a>(&self, session: &'a mut SessionData) -> &'a mut WorkspaceSession {
        session
            .workspaces
            .entry(self.workspace.clone())
            .or_insert_with(|| {
                debug!(workspace = %self.workspace, "Creating workspace session");
                WorkspaceSession::default()
            })
    }

    /// Drop the entry for the active workspace only
    pub fn remove(&self, session: &mut SessionData) -> Option<WorkspaceSession> {
        session.workspaces.remove(&self.workspace)
    }
}

/// Process-wide count of failed authorizations
#[derive(Debug, Default)]
pub struct AuthFailures {
    count: AtomicU32,
}

impl AuthFailures {
    /// Create a zeroed counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failed authorization, returning the new count
    pub fn record_failure(&self) -> u32 {
        self.count.fetch_add(1, Ordering::SeqCst).saturating_add(1)
    }

    /// Clear the counter after a successful authorization
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }

    /// Current count
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }

    /// Whether clients must solve a captcha before the next attempt
    pub fn needs_captcha(&self) -> bool {
        self.count() > CAPTCHA_THRESHOLD
    }
}
