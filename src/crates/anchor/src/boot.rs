//! Boot progress tracking
//!
//! Independent subsystems report startup progress into a single
//! [`BootSequencer`]. Progress only grows; once it reaches 100 the kernel is
//! booted and every further update is ignored.
//!
//! Progress is not clamped: callers budget their deltas to sum to 100, and
//! an overshoot is kept as reported.

use crate::version;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Notify;
use tracing::info;

/// Progress value at which the kernel counts as booted
pub const BOOTED: u32 = 100;

/// Details shown while the final stage completes
pub const FINISHING_DETAILS: &str = "Finishing boot...";

/// Point-in-time view of boot progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootProgress {
    pub progress: u32,
    pub details: String,
}

impl BootProgress {
    /// Whether this snapshot was taken after boot completed
    pub fn is_ready(&self) -> bool {
        self.progress >= BOOTED
    }
}

#[derive(Debug, Default)]
struct Details {
    text: String,
    /// Set by `mark_booted`; no later write may replace the final text
    sealed: bool,
}

/// Concurrent boot progress counter with status text
#[derive(Debug, Default)]
pub struct BootSequencer {
    progress: AtomicU32,
    details: Mutex<Details>,
    ready: Notify,
}

impl BootSequencer {
    /// Create a sequencer at progress 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to progress and replace the details
    ///
    /// Ignored once booted. The sum saturates at `u32::MAX` instead of
    /// wrapping. Concurrent callers need no coordination; the last details
    /// written win.
    pub fn advance(&self, delta: u32, details: &str) {
        let Ok(previous) = self
            .progress
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |p| {
                (p < BOOTED).then(|| p.saturating_add(delta))
            })
        else {
            return;
        };
        let crossed = previous.saturating_add(delta) >= BOOTED;

        {
            let mut current = self.details.lock();
            // Another caller may have finished boot since the add
            if !current.sealed && (crossed || !self.is_ready()) {
                current.text = tagged(details);
            }
        }
        if crossed {
            self.ready.notify_waiters();
        }
    }

    /// Replace the details without moving progress; ignored once booted
    pub fn set_details(&self, details: &str) {
        let mut current = self.details.lock();
        if current.sealed || self.is_ready() {
            return;
        }
        current.text = tagged(details);
    }

    /// Force the booted state; idempotent
    ///
    /// Raises progress to at least 100; an earlier overshoot is kept.
    pub fn mark_booted(&self) {
        {
            let mut current = self.details.lock();
            current.text = tagged(FINISHING_DETAILS);
            current.sealed = true;
            self.progress.fetch_max(BOOTED, Ordering::SeqCst);
        }
        self.ready.notify_waiters();
        info!("kernel booted");
    }

    /// Current progress and details
    pub fn snapshot(&self) -> BootProgress {
        let details = self.details.lock();
        BootProgress {
            progress: self.progress(),
            details: details.text.clone(),
        }
    }

    /// Current progress
    pub fn progress(&self) -> u32 {
        self.progress.load(Ordering::SeqCst)
    }

    /// Whether boot has completed
    pub fn is_ready(&self) -> bool {
        self.progress() >= BOOTED
    }

    /// Wait until boot has completed
    pub async fn wait_ready(&self) {
        loop {
            // Register before checking so a concurrent notify is not lost
            let notified = self.ready.notified();
            if self.is_ready() {
                return;
            }
            notified.await;
        }
    }
}

fn tagged(details: &str) -> String {
    format!("{} {}", version::tag(), details)
}
