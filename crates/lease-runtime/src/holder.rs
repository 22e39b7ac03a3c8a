//! Holder wiring: acquire, heartbeat with a concurrent status endpoint,
//! release.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use lc_03_holder_agent::{
    status_router, AgentConfig, ExitReason, HeartbeatScheduler, HolderAgent, HttpIssuerClient,
    IssuerClient,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// How the holder ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolderExit {
    /// Stopped on request.
    Shutdown { released: bool },
    /// Stopped because consecutive checkin failures exceeded the maximum.
    FailureThreshold { failures: u32, released: bool },
}

impl HolderExit {
    /// Only an orderly shutdown with the lease returned is a clean exit.
    pub fn is_success(&self) -> bool {
        matches!(self, HolderExit::Shutdown { released: true })
    }

    pub fn describe(&self) -> String {
        match self {
            HolderExit::Shutdown { released: true } => "lease released, shut down cleanly".into(),
            HolderExit::Shutdown { released: false } => {
                "shut down without releasing the lease".into()
            }
            HolderExit::FailureThreshold { failures, released } => format!(
                "checkin failed {} consecutive times; lease {}",
                failures,
                if *released { "released" } else { "not released" }
            ),
        }
    }
}

/// Run the holder against the issuer at `config.issuer_url`.
pub async fn run_holder(
    config: AgentConfig,
    status: Option<TcpListener>,
    shutdown: watch::Receiver<bool>,
    abort: watch::Receiver<bool>,
) -> Result<HolderExit> {
    config.validate()?;
    let client = HttpIssuerClient::new(&config.issuer_url, config.request_timeout)?;
    run_holder_with(Arc::new(client), config, status, shutdown, abort).await
}

/// Run the holder over any [`IssuerClient`].
///
/// Acquisition failure is returned as an error; everything after that is
/// reported through [`HolderExit`].
pub async fn run_holder_with<C: IssuerClient + ?Sized + 'static>(
    client: Arc<C>,
    config: AgentConfig,
    status: Option<TcpListener>,
    shutdown: watch::Receiver<bool>,
    abort: watch::Receiver<bool>,
) -> Result<HolderExit> {
    let mut agent = HolderAgent::new(client, config.clone());
    let lease_id = agent
        .acquire()
        .await
        .map(|lease| lease.id())
        .context("lease acquisition failed")?;

    let scheduler = HeartbeatScheduler::new(agent);
    let (status_stop, status_task) = match status {
        Some(listener) => {
            let (stop_tx, mut stop_rx) = watch::channel(false);
            let app = status_router(scheduler.subscribe());
            let addr = listener.local_addr().ok();
            info!(addr = ?addr, "[lc-03] status endpoint listening");
            let task = tokio::spawn(async move {
                axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = stop_rx.wait_for(|stop| *stop).await;
                    })
                    .await
            });
            (Some(stop_tx), Some(task))
        }
        None => (None, None),
    };

    let (mut agent, reason) = scheduler.run(shutdown).await;

    let exit = match reason {
        ExitReason::Shutdown | ExitReason::NotActive => {
            let mut abort = abort;
            let released = release(&mut agent, &mut abort).await;
            HolderExit::Shutdown { released }
        }
        ExitReason::FailureThreshold { failures } => {
            // The issuer is likely unreachable; do not retry forever.
            let config = agent.config();
            let deadline = config.release_backoff * (config.max_server_retries + 1)
                + config.request_timeout;
            let mut bounded = BoundedAbort::new(abort, deadline);
            let released = release(&mut agent, &mut bounded.signal).await;
            bounded.disarm().await;
            HolderExit::FailureThreshold { failures, released }
        }
    };

    if let Some(stop) = status_stop {
        stop.send_replace(true);
    }
    if let Some(task) = status_task {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "[lc-03] status endpoint failed"),
            Err(e) => warn!(error = %e, "[lc-03] status endpoint task panicked"),
        }
    }

    info!(lease_id = %lease_id, exit = ?exit, "[lc-03] holder finished");
    Ok(exit)
}

async fn release<C: IssuerClient + ?Sized>(
    agent: &mut HolderAgent<C>,
    abort: &mut watch::Receiver<bool>,
) -> bool {
    match agent.release(abort).await {
        Ok(()) => true,
        Err(err) => {
            error!(error = %err, "[lc-03] lease release failed");
            false
        }
    }
}

/// Abort signal that also fires after `deadline`.
struct BoundedAbort {
    signal: watch::Receiver<bool>,
    timer: JoinHandle<()>,
}

impl BoundedAbort {
    fn new(mut abort: watch::Receiver<bool>, deadline: Duration) -> Self {
        let (tx, signal) = watch::channel(false);
        let timer = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(deadline) => {}
                // A dropped sender leaves only the deadline.
                Ok(_) = abort.wait_for(|stop| *stop) => {}
            }
            let _ = tx.send(true);
        });
        Self { signal, timer }
    }

    /// Stop the timer task once the guarded operation is over.
    async fn disarm(self) {
        self.timer.abort();
        let _ = self.timer.await;
    }
}
