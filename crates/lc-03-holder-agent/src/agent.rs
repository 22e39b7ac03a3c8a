//! # Holder Agent
//!
//! Owns the held lease and the failure tracker. One tick of the heartbeat
//! is [`HolderAgent::run_tick`]; the scheduler decides when ticks happen and
//! when to stop.

use std::sync::Arc;
use std::time::Duration;

use lease_crypto::{seal_challenge, verify_echo, ChallengePublicKey};
use lease_telemetry::{
    HistogramTimer, HOLDER_CHECKINS, HOLDER_CHECKIN_DURATION, HOLDER_CONSECUTIVE_FAILURES,
};
use lease_types::{
    CheckinRequest, GrantRequest, LeaseId, LeaseView, PatchLeaseRequest, SystemTimeSource,
    TimeSource,
};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::domain::config::AgentConfig;
use crate::domain::errors::{AgentError, AgentResult};
use crate::domain::tracker::{FailureTracker, HolderEvent, HolderState};
use crate::ports::outbound::IssuerClient;

/// The lease this process holds, with its decoded public key.
#[derive(Debug, Clone)]
pub struct HeldLease {
    pub view: LeaseView,
    pub public_key: ChallengePublicKey,
}

impl HeldLease {
    pub fn id(&self) -> LeaseId {
        self.view.id
    }
}

/// Result of one heartbeat tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Echo verified; the failure counter is zero.
    Success,
    /// The tick counted one failure.
    Failed(AgentError),
    /// Shutdown was requested mid-tick.
    Cancelled,
}

/// Point-in-time view of the agent, served by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSnapshot {
    pub lease_id: Option<LeaseId>,
    pub holder: String,
    pub state: &'static str,
    pub consecutive_failures: u32,
    pub successful_checkins: u64,
    pub failed_checkins: u64,
    pub last_error: Option<String>,
}

impl AgentSnapshot {
    /// Snapshot of an agent that has not acquired anything yet.
    pub fn initial(holder: impl Into<String>) -> Self {
        Self {
            lease_id: None,
            holder: holder.into(),
            state: HolderState::Acquiring.name(),
            consecutive_failures: 0,
            successful_checkins: 0,
            failed_checkins: 0,
            last_error: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == "active"
    }
}

/// Lease holder: acquire, check in, release.
pub struct HolderAgent<C: IssuerClient + ?Sized> {
    client: Arc<C>,
    config: AgentConfig,
    lease: Option<HeldLease>,
    tracker: FailureTracker,
    last_error: Option<AgentError>,
    snapshots: watch::Sender<AgentSnapshot>,
}

impl<C: IssuerClient + ?Sized> HolderAgent<C> {
    pub fn new(client: Arc<C>, config: AgentConfig) -> Self {
        let tracker = FailureTracker::new(config.max_checkin_failure);
        let (snapshots, _) = watch::channel(AgentSnapshot::initial(config.holder.clone()));
        Self {
            client,
            config,
            lease: None,
            tracker,
            last_error: None,
            snapshots,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn lease(&self) -> Option<&HeldLease> {
        self.lease.as_ref()
    }

    pub fn state(&self) -> HolderState {
        self.tracker.state()
    }

    pub fn tracker(&self) -> &FailureTracker {
        &self.tracker
    }

    pub fn threshold_exceeded(&self) -> bool {
        self.tracker.threshold_exceeded()
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            lease_id: self.lease.as_ref().map(HeldLease::id),
            holder: self.config.holder.clone(),
            state: self.tracker.state().name(),
            consecutive_failures: self.tracker.consecutive_failures(),
            successful_checkins: self.tracker.total_successes(),
            failed_checkins: self.tracker.total_failures(),
            last_error: self.last_error.as_ref().map(ToString::to_string),
        }
    }

    /// Receiver for snapshots, republished on every state change.
    pub fn subscribe(&self) -> watch::Receiver<AgentSnapshot> {
        self.snapshots.subscribe()
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }

    /// Request a lease from the issuer.
    ///
    /// Any failure is terminal for the process: the agent moves to
    /// `FailedStart` and the error is returned to the caller.
    pub async fn acquire(&mut self) -> AgentResult<&HeldLease> {
        let request = GrantRequest {
            owner: self.config.owner.clone(),
            holder: self.config.holder.clone(),
            password: self.config.password.clone(),
        };

        match self.request_grant(&request).await {
            Ok(held) => {
                info!(
                    lease_id = %held.id(),
                    owner = %held.view.owner,
                    holder = %held.view.holder,
                    "[lc-03] lease acquired"
                );
                self.tracker.process_event(HolderEvent::Acquired);
                HOLDER_CONSECUTIVE_FAILURES.set(0);
                self.lease = Some(held);
                self.publish();
                self.lease.as_ref().ok_or(AgentError::NoLease)
            }
            Err(err) => {
                error!(owner = %request.owner, error = %err, "[lc-03] lease acquisition failed");
                self.tracker.process_event(HolderEvent::AcquireFailed);
                self.last_error = Some(err.clone());
                self.publish();
                Err(err)
            }
        }
    }

    async fn request_grant(&self, request: &GrantRequest) -> AgentResult<HeldLease> {
        let view = self.client.grant(request).await?;
        let key = view
            .public_key_bytes()
            .map_err(|e| AgentError::Decode(e.to_string()))?;
        Ok(HeldLease {
            public_key: ChallengePublicKey::from_bytes(key),
            view,
        })
    }

    /// One checkin attempt with a fresh challenge. No retries, no accounting.
    pub async fn checkin_once(&self) -> AgentResult<()> {
        let lease = self.lease.as_ref().ok_or(AgentError::NoLease)?;

        let (challenge, ciphertext) = seal_challenge(&lease.public_key)?;
        let request = CheckinRequest::new(self.config.holder.clone(), &ciphertext);

        let response = {
            let _timer = HistogramTimer::new(&HOLDER_CHECKIN_DURATION);
            self.client.checkin(lease.id(), &request).await?
        };

        let echo = response
            .echo_bytes()
            .map_err(|e| AgentError::Decode(e.to_string()))?;
        verify_echo(&challenge, &echo).map_err(|_| AgentError::ProtocolMismatch)
    }

    /// Run one heartbeat tick.
    ///
    /// 5xx responses are retried up to `max_server_retries` times with
    /// `server_backoff` between attempts and count as a single failure once
    /// exhausted. A transport failure is counted and followed by
    /// `transport_backoff`. Every wait observes `cancel`.
    pub async fn run_tick(&mut self, cancel: &mut watch::Receiver<bool>) -> TickOutcome {
        let outcome = self.tick(cancel).await;
        self.publish();
        outcome
    }

    async fn tick(&mut self, cancel: &mut watch::Receiver<bool>) -> TickOutcome {
        let mut retries = 0u32;

        let result = loop {
            let attempt = tokio::select! {
                biased;
                _ = cancelled(cancel) => return TickOutcome::Cancelled,
                attempt = self.checkin_once() => attempt,
            };

            match attempt {
                Err(err) if err.is_server_error() && retries < self.config.max_server_retries => {
                    retries += 1;
                    warn!(
                        error = %err,
                        retry = retries,
                        max_retries = self.config.max_server_retries,
                        "[lc-03] checkin hit issuer error, retrying"
                    );
                    if !sleep_or_cancel(self.config.server_backoff, cancel).await {
                        return TickOutcome::Cancelled;
                    }
                }
                other => break other,
            }
        };

        match result {
            Ok(()) => {
                self.tracker.process_event(HolderEvent::CheckinSucceeded);
                self.last_error = None;
                HOLDER_CHECKINS.with_label_values(&["success"]).inc();
                HOLDER_CONSECUTIVE_FAILURES.set(0);
                debug!(holder = %self.config.holder, "[lc-03] checkin verified");
                TickOutcome::Success
            }
            Err(err) => {
                self.tracker.process_event(HolderEvent::CheckinFailed);
                let failures = self.tracker.consecutive_failures();
                HOLDER_CHECKINS
                    .with_label_values(&[err.class().label()])
                    .inc();
                HOLDER_CONSECUTIVE_FAILURES.set(i64::from(failures));
                warn!(
                    error = %err,
                    class = err.class().label(),
                    consecutive_failures = failures,
                    max = self.config.max_checkin_failure,
                    "[lc-03] checkin failed"
                );
                self.last_error = Some(err.clone());

                if err.is_transport()
                    && !sleep_or_cancel(self.config.transport_backoff, cancel).await
                {
                    return TickOutcome::Cancelled;
                }
                TickOutcome::Failed(err)
            }
        }
    }

    /// Return the lease to the issuer.
    ///
    /// 5xx and transport failures are retried every `release_backoff` until
    /// the issuer acknowledges or `abort` fires; any 4xx ends the attempt.
    /// Without a held lease this is a no-op.
    pub async fn release(&mut self, abort: &mut watch::Receiver<bool>) -> AgentResult<()> {
        let Some(id) = self.lease.as_ref().map(HeldLease::id) else {
            return Ok(());
        };
        self.tracker.process_event(HolderEvent::ShutdownRequested);
        self.publish();
        let result = self.return_lease(id, abort).await;
        self.publish();
        result
    }

    async fn return_lease(
        &mut self,
        id: LeaseId,
        abort: &mut watch::Receiver<bool>,
    ) -> AgentResult<()> {

        let request = PatchLeaseRequest::revoke(&SystemTimeSource.now());
        let mut attempts = 0u32;
        // Only release outcomes are reported here, never an earlier checkin error.
        let mut last_failure: Option<AgentError> = None;

        loop {
            attempts += 1;
            let result = tokio::select! {
                biased;
                _ = cancelled(abort) => {
                    warn!(lease_id = %id, attempts = attempts - 1, "[lc-03] release aborted");
                    return Err(last_failure.unwrap_or(AgentError::ReleaseAborted));
                }
                result = self.client.revoke(id, &request) => result,
            };

            match result {
                Ok(view) => {
                    self.tracker.process_event(HolderEvent::Released);
                    info!(lease_id = %id, status = %view.status, attempts, "[lc-03] lease released");
                    return Ok(());
                }
                Err(err) if err.is_server_error() || err.is_transport() => {
                    warn!(lease_id = %id, error = %err, attempts, "[lc-03] release failed, retrying");
                    self.last_error = Some(err.clone());
                    if !sleep_or_cancel(self.config.release_backoff, abort).await {
                        return Err(err);
                    }
                    last_failure = Some(err);
                }
                Err(err) => {
                    error!(lease_id = %id, error = %err, "[lc-03] release rejected");
                    self.last_error = Some(err.clone());
                    return Err(err);
                }
            }
        }
    }
}

/// Resolves once `signal` turns `true`. Never resolves if the sender is gone.
pub(crate) async fn cancelled(signal: &mut watch::Receiver<bool>) {
    if signal.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Sleep for `duration`; `false` if `signal` fired first.
pub(crate) async fn sleep_or_cancel(duration: Duration, signal: &mut watch::Receiver<bool>) -> bool {
    if *signal.borrow() {
        return false;
    }
    tokio::select! {
        biased;
        _ = cancelled(signal) => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
