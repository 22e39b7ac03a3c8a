//! # Queries and Conditional Updates
//!
//! The protocol never does read-modify-write on a lease from the outside.
//! Callers describe the state they expect ([`Precondition`]) and the change
//! they want ([`LeaseMutation`]); the store applies both under one lock.

use chrono::{DateTime, Utc};
use lease_types::{Lease, LeaseStatus};

/// Attribute filter for [`LeaseStore::find`](crate::LeaseStore::find).
///
/// `None` fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaseQuery {
    pub owner: Option<String>,
    pub holder: Option<String>,
    pub status: Option<LeaseStatus>,
}

impl LeaseQuery {
    /// Matches every lease.
    pub fn all() -> Self {
        Self::default()
    }

    /// The quota query: ACTIVE leases belonging to `owner`.
    pub fn active_for_owner(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            holder: None,
            status: Some(LeaseStatus::Active),
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_holder(mut self, holder: impl Into<String>) -> Self {
        self.holder = Some(holder.into());
        self
    }

    pub fn with_status(mut self, status: LeaseStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, lease: &Lease) -> bool {
        self.owner.as_deref().map_or(true, |o| o == lease.owner)
            && self.holder.as_deref().map_or(true, |h| h == lease.holder)
            && self.status.map_or(true, |s| s == lease.status)
    }
}

/// State a record must be in for a mutation to apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Precondition {
    pub status: Option<LeaseStatus>,
    pub holder: Option<String>,
}

impl Precondition {
    /// No expectations.
    pub fn any() -> Self {
        Self::default()
    }

    /// ACTIVE and bound to `holder`; the checkin precondition.
    pub fn active_held_by(holder: impl Into<String>) -> Self {
        Self {
            status: Some(LeaseStatus::Active),
            holder: Some(holder.into()),
        }
    }

    pub fn holds_for(&self, lease: &Lease) -> bool {
        self.status.map_or(true, |s| s == lease.status)
            && self.holder.as_deref().map_or(true, |h| h == lease.holder)
    }
}

/// A change to one lease record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseMutation {
    /// Record a successful checkin.
    Touch { at: DateTime<Utc> },
    /// ACTIVE → REVOKED. A no-op on a revoked lease.
    Revoke { at: DateTime<Utc> },
}

impl LeaseMutation {
    /// Apply to `lease`; returns whether anything changed.
    pub fn apply(self, lease: &mut Lease) -> bool {
        match self {
            LeaseMutation::Touch { at } => {
                lease.touch(at);
                true
            }
            LeaseMutation::Revoke { at } => lease.revoke(at),
        }
    }
}

/// Result of [`LeaseStore::compare_and_update`](crate::LeaseStore::compare_and_update).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Precondition held and the record changed. Carries the new state.
    Applied(Lease),
    /// Precondition held but the mutation was a no-op (revoking a revoked
    /// lease). Carries the untouched record.
    Unchanged(Lease),
    /// Precondition failed; nothing was written. Carries the current record.
    PreconditionFailed(Lease),
    NotFound,
}

/// Result of [`LeaseStore::create_within_quota`](crate::LeaseStore::create_within_quota).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(Lease),
    /// The owner already holds `active` ACTIVE leases, `active >= cap`.
    QuotaExceeded { active: usize, cap: usize },
}
