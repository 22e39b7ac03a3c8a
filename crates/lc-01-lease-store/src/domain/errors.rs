//! # Store Errors
//!
//! Failures of the backing store itself. A missing record is not an error at
//! this layer; lookups return `Option` and updates return
//! [`UpdateOutcome::NotFound`](crate::UpdateOutcome::NotFound).

use thiserror::Error;

/// Errors raised by a [`LeaseStore`](crate::LeaseStore) backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    #[error("Lease store unavailable: {message}")]
    Unavailable { message: String },

    /// The id sequence is exhausted.
    #[error("Lease id space exhausted")]
    IdExhausted,
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            message: message.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
