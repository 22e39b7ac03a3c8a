//! # Issuer Service
//!
//! Implements [`IssuerApi`] over a [`LeaseStore`], an [`Authenticator`] and a
//! [`TimeSource`]. Every state change goes through a single store call
//! (`create_within_quota` or `compare_and_update`), so a transition is either
//! fully applied or not at all.

use std::sync::Arc;

use async_trait::async_trait;
use lc_01_lease_store::{
    CreateOutcome, LeaseMutation, LeaseQuery, LeaseStore, Precondition, UpdateOutcome,
};
use lease_crypto::{open_challenge, ChallengeKeyPair, ChallengeSecretKey};
use lease_telemetry::{ISSUER_CHECKINS, ISSUER_GRANTS, ISSUER_REVOCATIONS, LEASES_ACTIVE};
use lease_types::time::parse_timestamp;
use lease_types::{
    GrantRequest, Lease, LeaseId, LeaseView, NewLease, PatchLeaseRequest, PublicKeyBytes,
    SecretKeyBytes, SystemTimeSource, TimeSource,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::config::IssuerConfig;
use crate::domain::errors::{ForbiddenReason, IssuerError, IssuerResult};
use crate::ports::inbound::IssuerApi;
use crate::ports::outbound::{AllowAllAuthenticator, Authenticator};

/// Issuer service.
pub struct IssuerService<S, A = AllowAllAuthenticator> {
    store: Arc<S>,
    authenticator: Arc<A>,
    clock: Arc<dyn TimeSource>,
    config: IssuerConfig,
}

impl<S: LeaseStore> IssuerService<S, AllowAllAuthenticator> {
    /// Service with the wall clock and no authentication.
    ///
    /// `config` is expected to be validated by the caller.
    pub fn new(store: Arc<S>, config: IssuerConfig) -> Self {
        Self::with_parts(
            store,
            Arc::new(AllowAllAuthenticator),
            Arc::new(SystemTimeSource),
            config,
        )
    }
}

impl<S: LeaseStore, A: Authenticator> IssuerService<S, A> {
    pub fn with_parts(
        store: Arc<S>,
        authenticator: Arc<A>,
        clock: Arc<dyn TimeSource>,
        config: IssuerConfig,
    ) -> Self {
        Self {
            store,
            authenticator,
            clock,
            config,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    fn require(&self, id: LeaseId) -> IssuerResult<Lease> {
        self.store.get(id)?.ok_or(IssuerError::NotFound { id })
    }

    fn create(&self, owner: String, holder: String) -> IssuerResult<LeaseView> {
        let pair = ChallengeKeyPair::generate();
        let new = NewLease {
            key: Uuid::new_v4(),
            owner: owner.clone(),
            holder,
            public_key: PublicKeyBytes(*pair.public_key().as_bytes()),
            secret_key: SecretKeyBytes(pair.secret_key().to_bytes()),
            created_at: self.clock.now(),
        };

        match self
            .store
            .create_within_quota(new, self.config.max_active_per_owner)?
        {
            CreateOutcome::Created(lease) => {
                LEASES_ACTIVE.inc();
                info!(
                    lease_id = %lease.id,
                    owner = %lease.owner,
                    holder = %lease.holder,
                    "[lc-02] lease granted"
                );
                Ok(LeaseView::from(&lease))
            }
            CreateOutcome::QuotaExceeded { active, cap } => {
                warn!(owner = %owner, active, cap, "[lc-02] grant rejected: quota exceeded");
                Err(IssuerError::QuotaExceeded { owner, active, cap })
            }
        }
    }

    fn checkin_inner(&self, id: LeaseId, holder: &str, ciphertext: &[u8]) -> IssuerResult<Vec<u8>> {
        let lease = self.require(id)?;

        if lease.holder != holder {
            warn!(
                lease_id = %id,
                claimed = %holder,
                "[lc-02] checkin refused: holder mismatch"
            );
            return Err(IssuerError::Forbidden {
                id,
                reason: ForbiddenReason::HolderMismatch,
            });
        }
        if !lease.is_active() {
            debug!(lease_id = %id, "[lc-02] checkin refused: lease revoked");
            return Err(IssuerError::Forbidden {
                id,
                reason: ForbiddenReason::Revoked,
            });
        }

        let secret = ChallengeSecretKey::from_bytes(lease.secret_key.0);
        let challenge = open_challenge(&secret, ciphertext).map_err(|e| {
            debug!(lease_id = %id, error = %e, "[lc-02] checkin challenge rejected");
            IssuerError::BadRequest(format!("challenge could not be opened: {}", e))
        })?;

        let touch = LeaseMutation::Touch {
            at: self.clock.now(),
        };
        match self
            .store
            .compare_and_update(id, &Precondition::active_held_by(holder), touch)?
        {
            UpdateOutcome::Applied(_) | UpdateOutcome::Unchanged(_) => {
                debug!(lease_id = %id, holder = %holder, "[lc-02] checkin accepted");
                Ok(challenge.as_bytes().to_vec())
            }
            // Revoked between the read and the write.
            UpdateOutcome::PreconditionFailed(current) => Err(IssuerError::Forbidden {
                id,
                reason: if current.holder != holder {
                    ForbiddenReason::HolderMismatch
                } else {
                    ForbiddenReason::Revoked
                },
            }),
            UpdateOutcome::NotFound => Err(IssuerError::NotFound { id }),
        }
    }
}

#[async_trait]
impl<S, A> IssuerApi for IssuerService<S, A>
where
    S: LeaseStore + 'static,
    A: Authenticator + 'static,
{
    async fn grant(&self, request: GrantRequest) -> IssuerResult<LeaseView> {
        let GrantRequest {
            owner,
            holder,
            password,
        } = request;

        if owner.trim().is_empty() || holder.trim().is_empty() {
            ISSUER_GRANTS.with_label_values(&["bad_request"]).inc();
            return Err(IssuerError::BadRequest(
                "owner and holder must be non-empty".into(),
            ));
        }

        if !self
            .authenticator
            .authenticate(&owner, password.as_deref())
            .await
        {
            ISSUER_GRANTS.with_label_values(&["unauthorized"]).inc();
            warn!(owner = %owner, "[lc-02] grant rejected: authentication failed");
            return Err(IssuerError::Unauthorized { owner });
        }

        let result = self.create(owner, holder);
        let label = match &result {
            Ok(_) => "granted",
            Err(e) => {
                if let IssuerError::Store(store_err) = e {
                    error!(error = %store_err, "[lc-02] grant failed in store");
                }
                e.kind()
            }
        };
        ISSUER_GRANTS.with_label_values(&[label]).inc();
        result
    }

    async fn checkin(
        &self,
        id: LeaseId,
        holder: &str,
        ciphertext: &[u8],
    ) -> IssuerResult<Vec<u8>> {
        let result = self.checkin_inner(id, holder, ciphertext);
        let label = match &result {
            Ok(_) => "ok",
            Err(e) => {
                if let IssuerError::Store(store_err) = e {
                    error!(lease_id = %id, error = %store_err, "[lc-02] checkin failed in store");
                }
                e.kind()
            }
        };
        ISSUER_CHECKINS.with_label_values(&[label]).inc();
        result
    }

    async fn revoke(&self, id: LeaseId) -> IssuerResult<LeaseView> {
        let revoke = LeaseMutation::Revoke {
            at: self.clock.now(),
        };
        match self
            .store
            .compare_and_update(id, &Precondition::any(), revoke)?
        {
            UpdateOutcome::Applied(lease) => {
                ISSUER_REVOCATIONS.inc();
                LEASES_ACTIVE.dec();
                info!(lease_id = %id, owner = %lease.owner, "[lc-02] lease revoked");
                Ok(LeaseView::from(&lease))
            }
            UpdateOutcome::Unchanged(lease) | UpdateOutcome::PreconditionFailed(lease) => {
                debug!(lease_id = %id, "[lc-02] lease already revoked");
                Ok(LeaseView::from(&lease))
            }
            UpdateOutcome::NotFound => Err(IssuerError::NotFound { id }),
        }
    }

    async fn patch(&self, id: LeaseId, request: PatchLeaseRequest) -> IssuerResult<LeaseView> {
        if let Some(raw) = request.revoked_at.as_deref() {
            parse_timestamp(raw).map_err(|e| IssuerError::BadRequest(e.to_string()))?;
            debug!(lease_id = %id, claimed = %raw, "[lc-02] client revoked_at ignored");
        }

        match request.status {
            Some(false) => self.revoke(id).await,
            Some(true) => {
                let lease = self.require(id)?;
                if lease.is_active() {
                    Ok(LeaseView::from(&lease))
                } else {
                    Err(IssuerError::BadRequest(format!(
                        "lease {} is REVOKED and cannot be reactivated",
                        id
                    )))
                }
            }
            None => self.get(id).await,
        }
    }

    async fn get(&self, id: LeaseId) -> IssuerResult<LeaseView> {
        self.require(id).map(|lease| LeaseView::from(&lease))
    }

    async fn list(&self, query: LeaseQuery) -> IssuerResult<Vec<LeaseView>> {
        Ok(self.store.find(&query)?.iter().map(LeaseView::from).collect())
    }

    async fn delete(&self, id: LeaseId) -> IssuerResult<LeaseView> {
        let lease = self.store.delete(id)?.ok_or(IssuerError::NotFound { id })?;
        if lease.is_active() {
            LEASES_ACTIVE.dec();
        }
        info!(lease_id = %id, "[lc-02] lease deleted");
        Ok(LeaseView::from(&lease))
    }
}
