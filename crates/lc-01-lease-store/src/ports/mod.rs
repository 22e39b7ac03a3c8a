//! # Store Port
//!
//! The interface the issuer requires from whatever persists leases.

use lease_types::{Lease, LeaseId, NewLease};

use crate::domain::errors::StoreResult;
use crate::domain::query::{CreateOutcome, LeaseMutation, LeaseQuery, Precondition, UpdateOutcome};

/// Lease persistence.
///
/// Production: any durable backend honoring the atomicity guarantees below.
/// Testing: [`InMemoryLeaseStore`](crate::InMemoryLeaseStore).
pub trait LeaseStore: Send + Sync {
    /// Insert a new ACTIVE lease unless `new.owner` already holds `cap`
    /// ACTIVE leases.
    ///
    /// ## Atomicity
    ///
    /// The quota count and the insert are one step: concurrent calls for the
    /// same owner never create more than `cap` ACTIVE leases.
    fn create_within_quota(&self, new: NewLease, cap: usize) -> StoreResult<CreateOutcome>;

    /// Look up a lease by id.
    fn get(&self, id: LeaseId) -> StoreResult<Option<Lease>>;

    /// All leases matching `query`, ordered by id.
    fn find(&self, query: &LeaseQuery) -> StoreResult<Vec<Lease>>;

    /// Number of ACTIVE leases held by `owner`.
    fn count_active(&self, owner: &str) -> StoreResult<usize> {
        Ok(self.find(&LeaseQuery::active_for_owner(owner))?.len())
    }

    /// Apply `mutation` to lease `id` if `expect` holds.
    ///
    /// ## Atomicity
    ///
    /// Check and write happen under the record's lock. Either the full
    /// mutation is visible afterwards or nothing changed.
    fn compare_and_update(
        &self,
        id: LeaseId,
        expect: &Precondition,
        mutation: LeaseMutation,
    ) -> StoreResult<UpdateOutcome>;

    /// Physically remove a lease. Returns the removed record.
    fn delete(&self, id: LeaseId) -> StoreResult<Option<Lease>>;
}
