//! Inbound Ports (Driving Ports)
//!
//! The API the HTTP adapter (or an in-process caller) drives.

use async_trait::async_trait;
use lc_01_lease_store::LeaseQuery;
use lease_types::{GrantRequest, LeaseId, LeaseView, PatchLeaseRequest};

use crate::domain::errors::IssuerResult;

/// Issuer API (Driving Port)
///
/// Every lease leaving this API is a [`LeaseView`]; the secret key never
/// crosses it.
#[async_trait]
pub trait IssuerApi: Send + Sync {
    /// Create an ACTIVE lease for `request.owner` bound to `request.holder`.
    async fn grant(&self, request: GrantRequest) -> IssuerResult<LeaseView>;

    /// Open the sealed challenge and return its plaintext.
    ///
    /// Holder and status are checked before any decryption is attempted.
    async fn checkin(&self, id: LeaseId, holder: &str, ciphertext: &[u8])
        -> IssuerResult<Vec<u8>>;

    /// ACTIVE → REVOKED. Revoking a revoked lease succeeds without touching
    /// `revoked_at`.
    async fn revoke(&self, id: LeaseId) -> IssuerResult<LeaseView>;

    /// Apply a `PATCH /licenses/{id}` body.
    async fn patch(&self, id: LeaseId, request: PatchLeaseRequest) -> IssuerResult<LeaseView>;

    async fn get(&self, id: LeaseId) -> IssuerResult<LeaseView>;

    async fn list(&self, query: LeaseQuery) -> IssuerResult<Vec<LeaseView>>;

    /// Administrative removal. Not part of the lease protocol.
    async fn delete(&self, id: LeaseId) -> IssuerResult<LeaseView>;
}
