//! Fault-injecting store wrapper for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use lease_types::{Lease, LeaseId, NewLease};

use super::InMemoryLeaseStore;
use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::query::{CreateOutcome, LeaseMutation, LeaseQuery, Precondition, UpdateOutcome};
use crate::ports::LeaseStore;

/// Delegates to an [`InMemoryLeaseStore`] until told to fail.
#[derive(Default)]
pub struct FailingLeaseStore {
    inner: InMemoryLeaseStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    applied_touches: AtomicUsize,
}

impl FailingLeaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &InMemoryLeaseStore {
        &self.inner
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Checkins that actually changed `last_checkin_at`.
    pub fn applied_touches(&self) -> usize {
        self.applied_touches.load(Ordering::SeqCst)
    }

    fn check_reads(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected read failure"));
        }
        Ok(())
    }

    fn check_writes(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected write failure"));
        }
        Ok(())
    }
}

impl LeaseStore for FailingLeaseStore {
    fn create_within_quota(&self, new: NewLease, cap: usize) -> StoreResult<CreateOutcome> {
        self.check_writes()?;
        self.inner.create_within_quota(new, cap)
    }

    fn get(&self, id: LeaseId) -> StoreResult<Option<Lease>> {
        self.check_reads()?;
        self.inner.get(id)
    }

    fn find(&self, query: &LeaseQuery) -> StoreResult<Vec<Lease>> {
        self.check_reads()?;
        self.inner.find(query)
    }

    fn compare_and_update(
        &self,
        id: LeaseId,
        expect: &Precondition,
        mutation: LeaseMutation,
    ) -> StoreResult<UpdateOutcome> {
        self.check_writes()?;
        let touch = matches!(mutation, LeaseMutation::Touch { .. });
        let outcome = self.inner.compare_and_update(id, expect, mutation)?;
        if touch && matches!(outcome, UpdateOutcome::Applied(_)) {
            self.applied_touches.fetch_add(1, Ordering::SeqCst);
        }
        Ok(outcome)
    }

    fn delete(&self, id: LeaseId) -> StoreResult<Option<Lease>> {
        self.check_writes()?;
        self.inner.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lease_types::{FixedTimeSource, PublicKeyBytes, SecretKeyBytes, TimeSource, KEY_LEN};

    fn new_lease() -> NewLease {
        NewLease {
            key: Default::default(),
            owner: "o".into(),
            holder: "h".into(),
            public_key: PublicKeyBytes([7; KEY_LEN]),
            secret_key: SecretKeyBytes([9; KEY_LEN]),
            created_at: FixedTimeSource::new(1_000).now(),
        }
    }

    #[test]
    fn test_injected_failures_toggle() {
        let store = FailingLeaseStore::new();
        store.set_fail_reads(true);
        assert!(matches!(
            store.get(LeaseId(1)),
            Err(StoreError::Unavailable { .. })
        ));
        store.set_fail_reads(false);
        assert_eq!(store.get(LeaseId(1)).unwrap(), None);
    }

    #[test]
    fn test_only_applied_touches_are_counted() {
        let store = FailingLeaseStore::new();
        let at = FixedTimeSource::new(2_000).now();
        let lease = match store.create_within_quota(new_lease(), 2).unwrap() {
            CreateOutcome::Created(lease) => lease,
            other => panic!("unexpected outcome: {:?}", other),
        };
        let held = Precondition::active_held_by("h");

        store.set_fail_writes(true);
        assert!(store.compare_and_update(lease.id, &held, LeaseMutation::Touch { at }).is_err());
        store.set_fail_writes(false);
        assert_eq!(store.applied_touches(), 0);

        store.compare_and_update(lease.id, &held, LeaseMutation::Touch { at }).unwrap();
        let wrong_holder = Precondition::active_held_by("other");
        store.compare_and_update(lease.id, &wrong_holder, LeaseMutation::Touch { at }).unwrap();
        assert_eq!(store.applied_touches(), 1);
    }
}
