//! # Wire Payloads
//!
//! JSON bodies exchanged over the issuer's HTTP surface.
//!
//! | Route | Request | Response |
//! |-------|---------|----------|
//! | `POST /licenses` | [`GrantRequest`] | `201` [`LeaseView`] |
//! | `PATCH /licenses/{id}` | [`PatchLeaseRequest`] | `200` [`LeaseView`] |
//! | `POST /licenses/{id}/checkin` | [`CheckinRequest`] | `200` [`CheckinResponse`] |
//! | `GET /licenses/{id}` | - | `200` [`LeaseView`] |
//! | `GET /licenses?owner=&holder=&status=` | [`ListLeasesParams`] | `200` `[LeaseView]` |
//!
//! Binary fields (public key, ciphertext, echo) are lowercase hex.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Lease, LeaseId, LeaseStatus, KEY_LEN};
use crate::errors::WireError;
use crate::time::{ts_format, ts_format_opt};

/// `POST /licenses` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRequest {
    pub owner: String,
    pub holder: String,
    /// Owner credential, checked by the issuer's authenticator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Outward projection of a lease. Never contains the secret key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseView {
    pub id: LeaseId,
    pub key: Uuid,
    pub owner: String,
    pub holder: String,
    pub public_key: String,
    pub status: LeaseStatus,
    #[serde(with = "ts_format")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "ts_format_opt")]
    pub revoked_at: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_format_opt")]
    pub last_checkin_at: Option<DateTime<Utc>>,
}

impl LeaseView {
    /// Decode the hex public key.
    pub fn public_key_bytes(&self) -> Result<[u8; KEY_LEN], WireError> {
        decode_fixed("public_key", &self.public_key)
    }
}

impl From<&Lease> for LeaseView {
    fn from(lease: &Lease) -> Self {
        Self {
            id: lease.id,
            key: lease.key,
            owner: lease.owner.clone(),
            holder: lease.holder.clone(),
            public_key: lease.public_key.to_hex(),
            status: lease.status,
            created_at: lease.created_at,
            revoked_at: lease.revoked_at,
            last_checkin_at: lease.last_checkin_at,
        }
    }
}

/// `PATCH /licenses/{id}` body.
///
/// `status: false` requests revocation. A client-supplied `revoked_at` is
/// accepted for compatibility; the issuer's clock is authoritative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchLeaseRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<String>,
}

impl PatchLeaseRequest {
    /// Body a holder sends to release its own lease.
    pub fn revoke(at: &DateTime<Utc>) -> Self {
        Self {
            status: Some(false),
            revoked_at: Some(crate::time::format_timestamp(at)),
        }
    }
}

/// `POST /licenses/{id}/checkin` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinRequest {
    pub holder: String,
    pub ciphertext: String,
}

impl CheckinRequest {
    pub fn new(holder: impl Into<String>, ciphertext: &[u8]) -> Self {
        Self {
            holder: holder.into(),
            ciphertext: hex::encode(ciphertext),
        }
    }

    pub fn ciphertext_bytes(&self) -> Result<Vec<u8>, WireError> {
        hex::decode(&self.ciphertext).map_err(|_| WireError::InvalidHex {
            field: "ciphertext",
        })
    }
}

/// `POST /licenses/{id}/checkin` success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinResponse {
    pub challenge_echo: String,
}

impl CheckinResponse {
    pub fn new(echo: &[u8]) -> Self {
        Self {
            challenge_echo: hex::encode(echo),
        }
    }

    pub fn echo_bytes(&self) -> Result<Vec<u8>, WireError> {
        hex::decode(&self.challenge_echo).map_err(|_| WireError::InvalidHex {
            field: "challenge_echo",
        })
    }
}

/// `GET /licenses` query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListLeasesParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Error body rendered for every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: String,
    pub message: String,
}

/// `GET /` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexBody {
    pub name: String,
    pub version: String,
    pub paths: String,
}

fn decode_fixed<const N: usize>(field: &'static str, raw: &str) -> Result<[u8; N], WireError> {
    let bytes = hex::decode(raw).map_err(|_| WireError::InvalidHex { field })?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| WireError::InvalidLength {
        field,
        expected: N,
        actual,
    })
}
