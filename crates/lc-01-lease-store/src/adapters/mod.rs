//! Store adapters.

mod memory;

pub use memory::InMemoryLeaseStore;

#[cfg(any(test, feature = "test-utils"))]
mod failing;

#[cfg(any(test, feature = "test-utils"))]
pub use failing::FailingLeaseStore;
