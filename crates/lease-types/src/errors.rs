//! Errors raised while decoding wire payloads.

use thiserror::Error;

/// Wire decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// A hex field could not be decoded
    #[error("Field '{field}' is not valid hex")]
    InvalidHex { field: &'static str },

    /// A fixed-size field had the wrong length
    #[error("Field '{field}' must be {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Unknown lease status literal
    #[error("Unknown lease status: {0}")]
    InvalidStatus(String),

    /// Timestamp did not match the fixed format
    #[error("Invalid timestamp '{0}', expected YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp(String),
}
