//! # Holder Agent (lc-03)
//!
//! Runs inside a worker process. Acquires one lease at startup, proves
//! liveness on a fixed interval with a sealed challenge, and releases the
//! lease on orderly shutdown.
//!
//! ## Per-Lease State Machine
//!
//! ```text
//! [ACQUIRING] ──grant ok──→ [ACTIVE {failures: 0}] ←──checkin ok──┐
//!      │                         │                                 │
//!      │                         └──checkin failed──→ [ACTIVE {failures: n+1}]
//!      │                                                   │
//!      │                              failures > max at tick start
//!      │                                                   ↓
//!      └──quota / transport──→ [FAILED_START]      [SHUTTING_DOWN] ──revoke ok──→ [RELEASED]
//! ```
//!
//! ## Checkin Outcome Classification
//!
//! | Outcome | Counter | Within the tick |
//! |---------|---------|-----------------|
//! | 2xx, echo matches | reset to 0 | done |
//! | 2xx, echo differs | +1 | done |
//! | 4xx | +1 | done |
//! | 5xx | +1 once retries are exhausted | retry after `server_backoff` |
//! | transport | +1 | sleep `transport_backoff`, then wait for the next tick |
//!
//! The failure counter and the held key are owned by the single checkin
//! worker; nothing else writes them.

pub mod adapters;
pub mod agent;
pub mod domain;
pub mod ports;
pub mod scheduler;

pub use adapters::http_client::HttpIssuerClient;
pub use adapters::status::status_router;
pub use agent::{AgentSnapshot, HeldLease, HolderAgent, TickOutcome};
pub use domain::config::AgentConfig;
pub use domain::errors::{AgentError, AgentResult, ConfigError, FailureClass};
pub use domain::tracker::{FailureTracker, HolderEvent, HolderState};
pub use ports::outbound::IssuerClient;
pub use scheduler::{ExitReason, HeartbeatScheduler};

/// Shutdown signal shared by the scheduler, the status server and the agent.
///
/// `true` means stop.
pub type ShutdownSignal = tokio::sync::watch::Receiver<bool>;
