//! Holder lifecycle and consecutive-failure accounting.
//!
//! State Machine:
//! ```text
//! [ACQUIRING] ──Acquired──→ [ACTIVE {failures: 0}]
//!      │                         │
//!      │                         ├── CheckinSucceeded ──→ [ACTIVE {failures: 0}]
//!      │                         ├── CheckinFailed ─────→ [ACTIVE {failures: n+1}]
//!      │                         └── ShutdownRequested ─→ [SHUTTING_DOWN] ──Released──→ [RELEASED]
//!      │
//!      └──AcquireFailed──→ [FAILED_START]
//! ```
//!
//! The tracker never decides to stop on its own; the scheduler consults
//! [`FailureTracker::threshold_exceeded`] at the start of each tick.

use serde::Serialize;

/// Holder lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum HolderState {
    /// No lease yet
    #[default]
    Acquiring,
    /// Lease held, heartbeat running
    Active { failures: u32 },
    /// Releasing the lease
    ShuttingDown,
    /// Lease returned to the issuer
    Released,
    /// Acquisition failed; the process must exit
    FailedStart,
}

impl HolderState {
    pub fn name(&self) -> &'static str {
        match self {
            HolderState::Acquiring => "acquiring",
            HolderState::Active { .. } => "active",
            HolderState::ShuttingDown => "shutting_down",
            HolderState::Released => "released",
            HolderState::FailedStart => "failed_start",
        }
    }
}

/// Events that drive [`HolderState`] transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HolderEvent {
    Acquired,
    AcquireFailed,
    CheckinSucceeded,
    CheckinFailed,
    ShutdownRequested,
    Released,
}

/// Per-lease failure tracker.
#[derive(Debug)]
pub struct FailureTracker {
    state: HolderState,
    max_checkin_failure: u32,
    total_successes: u64,
    total_failures: u64,
}

impl FailureTracker {
    pub fn new(max_checkin_failure: u32) -> Self {
        Self {
            state: HolderState::Acquiring,
            max_checkin_failure,
            total_successes: 0,
            total_failures: 0,
        }
    }

    pub fn state(&self) -> HolderState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, HolderState::Active { .. })
    }

    /// Consecutive failed checkins since the last success.
    pub fn consecutive_failures(&self) -> u32 {
        match self.state {
            HolderState::Active { failures } => failures,
            _ => 0,
        }
    }

    /// True once consecutive failures exceed the configured maximum.
    pub fn threshold_exceeded(&self) -> bool {
        matches!(self.state, HolderState::Active { failures } if failures > self.max_checkin_failure)
    }

    pub fn total_successes(&self) -> u64 {
        self.total_successes
    }

    pub fn total_failures(&self) -> u64 {
        self.total_failures
    }

    /// Apply an event and return the new state.
    pub fn process_event(&mut self, event: HolderEvent) -> HolderState {
        let new_state = self.next_state(event);

        if self.is_active() {
            match event {
                HolderEvent::CheckinSucceeded => self.total_successes += 1,
                HolderEvent::CheckinFailed => self.total_failures += 1,
                _ => {}
            }
        }

        self.state = new_state;
        new_state
    }

    fn next_state(&self, event: HolderEvent) -> HolderState {
        match (self.state, event) {
            (HolderState::Acquiring, HolderEvent::Acquired) => HolderState::Active { failures: 0 },
            (HolderState::Acquiring, HolderEvent::AcquireFailed) => HolderState::FailedStart,

            (HolderState::Active { .. }, HolderEvent::CheckinSucceeded) => {
                HolderState::Active { failures: 0 }
            }
            (HolderState::Active { failures }, HolderEvent::CheckinFailed) => HolderState::Active {
                failures: failures.saturating_add(1),
            },
            (HolderState::Active { .. }, HolderEvent::ShutdownRequested) => {
                HolderState::ShuttingDown
            }

            (HolderState::ShuttingDown, HolderEvent::Released) => HolderState::Released,

            (state, _) => state,
        }
    }

    #[cfg(test)]
    pub fn force_state(&mut self, state: HolderState) {
        self.state = state;
    }
}

impl Default for FailureTracker {
    fn default() -> Self {
        Self::new(super::config::DEFAULT_MAX_CHECKIN_FAILURE)
    }
}
