//! # Heartbeat Scheduler
//!
//! Single worker per lease. Ticks on a fixed interval; a tick that runs long
//! (retries, backoff) delays the next one instead of stacking ticks. Snapshots
//! come from the agent, so states reached after the loop (shutting down,
//! released) reach subscribers too.

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::agent::{cancelled, AgentSnapshot, HolderAgent, TickOutcome};
use crate::ports::outbound::IssuerClient;

/// Why the heartbeat stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Shutdown signal received.
    Shutdown,
    /// Consecutive failures exceeded the configured maximum.
    FailureThreshold { failures: u32 },
    /// The agent held no active lease.
    NotActive,
}

/// Drives [`HolderAgent::run_tick`].
pub struct HeartbeatScheduler<C: IssuerClient + ?Sized> {
    agent: HolderAgent<C>,
}

impl<C: IssuerClient + ?Sized> HeartbeatScheduler<C> {
    pub fn new(agent: HolderAgent<C>) -> Self {
        Self { agent }
    }

    /// Receiver for agent snapshots, updated after every tick and through
    /// release.
    pub fn subscribe(&self) -> watch::Receiver<AgentSnapshot> {
        self.agent.subscribe()
    }

    /// Run until shutdown or threshold breach. Hands the agent back so the
    /// caller can release the lease.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> (HolderAgent<C>, ExitReason) {
        if !self.agent.tracker().is_active() {
            return (self.agent, ExitReason::NotActive);
        }

        let period = self.agent.config().checkin_interval;
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately; the first checkin is one period out.
        ticker.tick().await;

        info!(
            interval_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
            max_failures = self.agent.config().max_checkin_failure,
            "[lc-03] heartbeat started"
        );

        let reason = loop {
            tokio::select! {
                biased;
                _ = cancelled(&mut shutdown) => break ExitReason::Shutdown,
                _ = ticker.tick() => {}
            }

            if self.agent.threshold_exceeded() {
                let failures = self.agent.tracker().consecutive_failures();
                error!(
                    failures,
                    max = self.agent.config().max_checkin_failure,
                    "[lc-03] checkin failure threshold exceeded"
                );
                break ExitReason::FailureThreshold { failures };
            }

            let outcome = self.agent.run_tick(&mut shutdown).await;
            if outcome == TickOutcome::Cancelled {
                break ExitReason::Shutdown;
            }
        };

        info!(reason = ?reason, "[lc-03] heartbeat stopped");
        (self.agent, reason)
    }
}
