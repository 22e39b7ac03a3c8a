//! # In-Memory Lease Store
//!
//! `DashMap` rows give per-record locking: `compare_and_update` holds the
//! shard write lock for the duration of check and write. Grants take an
//! additional store-wide mutex so the quota count cannot race another grant.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use lease_types::{Lease, LeaseId, NewLease};
use parking_lot::Mutex;
use tracing::debug;

use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::query::{CreateOutcome, LeaseMutation, LeaseQuery, Precondition, UpdateOutcome};
use crate::ports::LeaseStore;

/// Process-local lease store.
pub struct InMemoryLeaseStore {
    rows: DashMap<LeaseId, Lease>,
    next_id: AtomicU64,
    grant_lock: Mutex<()>,
}

impl Default for InMemoryLeaseStore {
    fn default() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicU64::new(1),
            grant_lock: Mutex::new(()),
        }
    }
}

impl InMemoryLeaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records, any status.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn allocate_id(&self) -> StoreResult<LeaseId> {
        self.next_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .map(LeaseId)
            .map_err(|_| StoreError::IdExhausted)
    }
}

impl LeaseStore for InMemoryLeaseStore {
    fn create_within_quota(&self, new: NewLease, cap: usize) -> StoreResult<CreateOutcome> {
        let _guard = self.grant_lock.lock();

        let active = self
            .rows
            .iter()
            .filter(|row| row.owner == new.owner && row.is_active())
            .count();
        if active >= cap {
            return Ok(CreateOutcome::QuotaExceeded { active, cap });
        }

        let id = self.allocate_id()?;
        let lease = Lease::from_new(id, new);
        self.rows.insert(id, lease.clone());
        debug!(lease_id = %id, owner = %lease.owner, "[lc-01] lease created");
        Ok(CreateOutcome::Created(lease))
    }

    fn get(&self, id: LeaseId) -> StoreResult<Option<Lease>> {
        Ok(self.rows.get(&id).map(|row| row.value().clone()))
    }

    fn find(&self, query: &LeaseQuery) -> StoreResult<Vec<Lease>> {
        let mut leases: Vec<Lease> = self
            .rows
            .iter()
            .filter(|row| query.matches(row.value()))
            .map(|row| row.value().clone())
            .collect();
        leases.sort_by_key(|l| l.id);
        Ok(leases)
    }

    fn compare_and_update(
        &self,
        id: LeaseId,
        expect: &Precondition,
        mutation: LeaseMutation,
    ) -> StoreResult<UpdateOutcome> {
        let Some(mut row) = self.rows.get_mut(&id) else {
            return Ok(UpdateOutcome::NotFound);
        };

        if !expect.holds_for(row.value()) {
            return Ok(UpdateOutcome::PreconditionFailed(row.value().clone()));
        }

        if mutation.apply(row.value_mut()) {
            debug!(lease_id = %id, ?mutation, "[lc-01] lease updated");
            Ok(UpdateOutcome::Applied(row.value().clone()))
        } else {
            Ok(UpdateOutcome::Unchanged(row.value().clone()))
        }
    }

    fn delete(&self, id: LeaseId) -> StoreResult<Option<Lease>> {
        Ok(self.rows.remove(&id).map(|(_, lease)| lease))
    }
}
