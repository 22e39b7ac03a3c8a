//! # Holder Agent Errors
//!
//! Every issuer response the holder can see maps to exactly one variant, and
//! every variant falls into one [`FailureClass`]. The class decides what the
//! heartbeat does next.

use lease_crypto::CryptoError;
use lease_types::ErrorBody;
use thiserror::Error;

/// Errors surfaced by the holder agent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    /// Owner is at its active-lease cap (grant refused with 403)
    #[error("Quota exceeded: {message}")]
    QuotaExceeded { message: String },

    /// Owner credential rejected (401)
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Lease unknown to the issuer (404)
    #[error("Lease not found: {message}")]
    NotFound { message: String },

    /// Holder mismatch or revoked lease (403)
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Any other 4xx
    #[error("Rejected with {status}: {message}")]
    BadRequest { status: u16, message: String },

    /// 5xx from the issuer
    #[error("Issuer error {status}: {message}")]
    TransientServerError { status: u16, message: String },

    /// Connection refused, reset, timed out, DNS failure
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Issuer answered 2xx with an echo that differs from the challenge
    #[error("Challenge echo mismatch")]
    ProtocolMismatch,

    /// 2xx body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Checkin or release attempted before a lease was acquired
    #[error("No lease held")]
    NoLease,

    /// Release abandoned by the abort signal before any attempt completed
    #[error("Release aborted")]
    ReleaseAborted,

    /// Local cryptographic failure (bad public key, sealing failure)
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Coarse failure classes driving retry policy and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// Permanent for this attempt; counted, not retried.
    ClientRejection,
    /// Retried within the tick with a short backoff.
    ServerError,
    /// Counted, followed by a long backoff.
    Transport,
    /// 2xx that failed verification; counted, not retried.
    Mismatch,
}

impl FailureClass {
    pub fn label(&self) -> &'static str {
        match self {
            FailureClass::ClientRejection => "client_rejection",
            FailureClass::ServerError => "server_error",
            FailureClass::Transport => "transport",
            FailureClass::Mismatch => "mismatch",
        }
    }
}

impl AgentError {
    /// Map a non-2xx status and its (optional) error body.
    pub fn from_status(status: u16, body: Option<ErrorBody>) -> Self {
        let message = body
            .as_ref()
            .map(|b| b.message.clone())
            .unwrap_or_else(|| format!("HTTP {}", status));
        match status {
            401 => AgentError::Unauthorized { message },
            403 if body.as_ref().is_some_and(|b| b.error == "quota_exceeded") => {
                AgentError::QuotaExceeded { message }
            }
            403 => AgentError::Forbidden { message },
            404 => AgentError::NotFound { message },
            400..=499 => AgentError::BadRequest { status, message },
            500..=599 => AgentError::TransientServerError { status, message },
            _ => AgentError::Decode(format!("unexpected status {}: {}", status, message)),
        }
    }

    pub fn class(&self) -> FailureClass {
        match self {
            AgentError::QuotaExceeded { .. }
            | AgentError::Unauthorized { .. }
            | AgentError::NotFound { .. }
            | AgentError::Forbidden { .. }
            | AgentError::BadRequest { .. }
            | AgentError::NoLease
            | AgentError::ReleaseAborted
            | AgentError::Crypto(_) => FailureClass::ClientRejection,
            AgentError::TransientServerError { .. } => FailureClass::ServerError,
            AgentError::TransportError(_) => FailureClass::Transport,
            AgentError::ProtocolMismatch | AgentError::Decode(_) => FailureClass::Mismatch,
        }
    }

    pub fn is_client_rejection(&self) -> bool {
        self.class() == FailureClass::ClientRejection
    }

    pub fn is_server_error(&self) -> bool {
        self.class() == FailureClass::ServerError
    }

    pub fn is_transport(&self) -> bool {
        self.class() == FailureClass::Transport
    }
}

/// Result type for holder agent operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {field}")]
    Missing { field: &'static str },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
