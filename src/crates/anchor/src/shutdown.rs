//! Graceful shutdown handling
//!
//! The served kernel runs until SIGINT/SIGTERM (Ctrl+C elsewhere), then
//! drops its context so the workspace lock is released.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{error, info, warn};

/// Shutdown coordinator for graceful termination
#[derive(Clone)]
pub struct ShutdownCoordinator {
    shutdown_requested: Arc<AtomicBool>,
    shutdown_notify: Arc<Notify>,
}

impl std::fmt::Debug for ShutdownCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownCoordinator")
            .field("shutdown_requested", &self.is_shutdown_requested())
            .finish()
    }
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator
    pub fn new() -> Self {
        Self {
            shutdown_requested: Arc::new(AtomicBool::new(false)),
            shutdown_notify: Arc::new(Notify::new()),
        }
    }

    /// Request shutdown; idempotent
    pub fn request_shutdown(&self) {
        if !self.shutdown_requested.swap(true, Ordering::SeqCst) {
            info!("Shutdown requested");
            self.shutdown_notify.notify_waiters();
        }
    }

    /// Check if shutdown has been requested
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    /// Wait for shutdown; returns immediately if already requested
    pub async fn wait_for_shutdown(&self) {
        let notified = self.shutdown_notify.notified();
        if self.is_shutdown_requested() {
            return;
        }
        notified.await;
    }

    /// Spawn a task that requests shutdown on SIGINT or SIGTERM
    ///
    /// If a handler cannot be installed the error is logged and the task
    /// ends; shutdown can still be requested programmatically.
    pub fn install_signal_handlers(&self) -> tokio::task::JoinHandle<()> {
        let coordinator = self.clone();

        tokio::spawn(async move {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};

                let (mut sigint, mut sigterm) =
                    match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
                        (Ok(int), Ok(term)) => (int, term),
                        (Err(e), _) | (_, Err(e)) => {
                            error!("install signal handlers failed: {}", e);
                            return;
                        }
                    };

                tokio::select! {
                    _ = sigint.recv() => {
                        warn!("Received SIGINT, releasing workspace...");
                    }
                    _ = sigterm.recv() => {
                        warn!("Received SIGTERM, releasing workspace...");
                    }
                }
                coordinator.request_shutdown();
            }

            #[cfg(not(unix))]
            {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("install Ctrl+C handler failed: {}", e);
                    return;
                }
                warn!("Received Ctrl+C, releasing workspace...");
                coordinator.request_shutdown();
            }
        })
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
