//! # Issuer Errors
//!
//! One variant per protocol outcome; [`IssuerError::status_code`] is the
//! single place where they meet HTTP.

use std::fmt;

use lc_01_lease_store::StoreError;
use lease_types::LeaseId;
use thiserror::Error;

/// Why a checkin was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenReason {
    /// The claimed holder is not the holder bound at grant time.
    HolderMismatch,
    /// The lease is REVOKED.
    Revoked,
}

impl fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForbiddenReason::HolderMismatch => f.write_str("holder does not match lease"),
            ForbiddenReason::Revoked => f.write_str("lease is revoked"),
        }
    }
}

/// Errors returned by [`IssuerApi`](crate::IssuerApi) operations.
#[derive(Debug, Error)]
pub enum IssuerError {
    #[error("Owner {owner} already holds {active} active leases (cap {cap})")]
    QuotaExceeded {
        owner: String,
        active: usize,
        cap: usize,
    },

    #[error("Owner {owner} could not be authenticated")]
    Unauthorized { owner: String },

    #[error("Lease {id} not found")]
    NotFound { id: LeaseId },

    #[error("Checkin refused for lease {id}: {reason}")]
    Forbidden { id: LeaseId, reason: ForbiddenReason },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IssuerError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            IssuerError::QuotaExceeded { .. } => 403,
            IssuerError::Unauthorized { .. } => 401,
            IssuerError::NotFound { .. } => 404,
            IssuerError::Forbidden { .. } => 403,
            IssuerError::BadRequest(_) => 400,
            IssuerError::Store(_) => 500,
        }
    }

    /// Stable machine-readable kind, used in error bodies and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            IssuerError::QuotaExceeded { .. } => "quota_exceeded",
            IssuerError::Unauthorized { .. } => "unauthorized",
            IssuerError::NotFound { .. } => "not_found",
            IssuerError::Forbidden { .. } => "forbidden",
            IssuerError::BadRequest(_) => "bad_request",
            IssuerError::Store(_) => "store_error",
        }
    }
}

/// Result type for issuer operations.
pub type IssuerResult<T> = Result<T, IssuerError>;

/// Invalid issuer configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
