//! # Lease Record Store (lc-01)
//!
//! Authoritative state for every lease. The issuer talks to the store only
//! through the [`LeaseStore`] port, so any durable key-value or relational
//! backend can stand behind it.
//!
//! ## Query Contract
//!
//! | Operation | Guarantee |
//! |-----------|-----------|
//! | `create_within_quota` | Count of ACTIVE leases per owner and the insert are one atomic step |
//! | `get` / `find` | Lookup by id or by `owner` / `holder` / `status` |
//! | `compare_and_update` | Precondition check and mutation are atomic per record |
//! | `delete` | Administrative removal, outside the protocol path |
//!
//! Operations on the same lease id are serialized; different ids proceed in
//! parallel.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - queries, preconditions, mutations, outcomes, errors
//! - `ports/` - the `LeaseStore` trait
//! - `adapters/` - `InMemoryLeaseStore` (and `FailingLeaseStore` for tests)
//!
//! ## Usage
//!
//! ```ignore
//! use lc_01_lease_store::{InMemoryLeaseStore, LeaseQuery, LeaseStore};
//!
//! let store = InMemoryLeaseStore::new();
//! let active = store.find(&LeaseQuery::active_for_owner("tester"))?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::InMemoryLeaseStore;
pub use domain::errors::{StoreError, StoreResult};
pub use domain::query::{
    CreateOutcome, LeaseMutation, LeaseQuery, Precondition, UpdateOutcome,
};
pub use ports::LeaseStore;

#[cfg(any(test, feature = "test-utils"))]
pub use adapters::FailingLeaseStore;
