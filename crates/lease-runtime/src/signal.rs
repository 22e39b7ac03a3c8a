//! Process signal handling.
//!
//! The first Ctrl+C / SIGTERM requests shutdown; the second aborts whatever
//! shutdown work is still retrying.

use tokio::sync::watch;
use tracing::{info, warn};

/// Owns the shutdown and abort channels for one process.
#[derive(Debug)]
pub struct ShutdownController {
    shutdown_tx: watch::Sender<bool>,
    abort_tx: watch::Sender<bool>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        let (abort_tx, _) = watch::channel(false);
        Self {
            shutdown_tx,
            abort_tx,
        }
    }

    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    pub fn abort_signal(&self) -> watch::Receiver<bool> {
        self.abort_tx.subscribe()
    }

    pub fn request_shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    pub fn request_abort(&self) {
        self.shutdown_tx.send_replace(true);
        self.abort_tx.send_replace(true);
    }

    /// Forward OS signals to the channels until the process exits.
    pub fn listen(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            wait_for_signal().await;
            info!("Shutdown signal received");
            self.request_shutdown();

            wait_for_signal().await;
            warn!("Second signal received, abandoning shutdown work");
            self.request_abort();
        })
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
                return;
            }
            Err(e) => warn!(error = %e, "SIGTERM handler unavailable, using Ctrl+C only"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Ctrl+C handler unavailable");
        std::future::pending::<()>().await;
    }
}
