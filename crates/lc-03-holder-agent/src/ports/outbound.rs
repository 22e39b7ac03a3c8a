//! # Issuer Client Port
//!
//! The three issuer calls the holder makes. Implementations map every
//! non-2xx response through [`AgentError::from_status`](crate::AgentError::from_status) and every
//! connection-level failure to [`AgentError::TransportError`](crate::AgentError::TransportError).

use async_trait::async_trait;
use lease_types::{
    CheckinRequest, CheckinResponse, GrantRequest, LeaseId, LeaseView, PatchLeaseRequest,
};

use crate::domain::errors::AgentResult;

/// Issuer as seen from the holder.
#[async_trait]
pub trait IssuerClient: Send + Sync {
    /// `POST /licenses`
    async fn grant(&self, request: &GrantRequest) -> AgentResult<LeaseView>;

    /// `POST /licenses/{id}/checkin`
    async fn checkin(&self, id: LeaseId, request: &CheckinRequest) -> AgentResult<CheckinResponse>;

    /// `PATCH /licenses/{id}`
    async fn revoke(&self, id: LeaseId, request: &PatchLeaseRequest) -> AgentResult<LeaseView>;
}
