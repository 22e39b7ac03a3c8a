//! Store domain types.

pub mod errors;
pub mod query;
