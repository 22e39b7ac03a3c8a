//! # Core Domain Entities
//!
//! The lease record as persisted by the record store.
//!
//! ## Invariants
//!
//! - `holder` never changes after creation.
//! - `status` only moves ACTIVE → REVOKED; REVOKED is terminal.
//! - `revoked_at` is set if and only if `status == REVOKED`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::time::{ts_format, ts_format_opt};

/// Length of an X25519 key in bytes.
pub const KEY_LEN: usize = 32;

/// Store-assigned lease identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaseId(pub u64);

impl fmt::Display for LeaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lease status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaseStatus {
    Active,
    Revoked,
}

impl LeaseStatus {
    /// Parse a status filter value.
    ///
    /// Accepts `ACTIVE` / `REVOKED` (any case) and the legacy `is_active`
    /// booleans `true` / `false`.
    pub fn from_query_value(raw: &str) -> Result<Self, crate::WireError> {
        match raw.to_ascii_lowercase().as_str() {
            "active" | "true" | "1" => Ok(LeaseStatus::Active),
            "revoked" | "false" | "0" => Ok(LeaseStatus::Revoked),
            _ => Err(crate::WireError::InvalidStatus(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LeaseStatus::Active => "ACTIVE",
            LeaseStatus::Revoked => "REVOKED",
        }
    }
}

impl fmt::Display for LeaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issuer-side secret key bytes. Zeroized on drop, redacted in `Debug`.
#[derive(Clone, PartialEq, Eq, Zeroize, Serialize, Deserialize)]
#[zeroize(drop)]
pub struct SecretKeyBytes(#[serde(with = "hex_key")] pub [u8; KEY_LEN]);

impl fmt::Debug for SecretKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKeyBytes(<redacted>)")
    }
}

/// Public key bytes handed to the holder.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyBytes(#[serde(with = "hex_key")] pub [u8; KEY_LEN]);

impl PublicKeyBytes {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for PublicKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKeyBytes({})", self.to_hex())
    }
}

mod hex_key {
    use super::KEY_LEN;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; KEY_LEN], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; KEY_LEN], D::Error> {
        let raw = String::deserialize(d)?;
        let decoded = hex::decode(&raw).map_err(serde::de::Error::custom)?;
        decoded
            .try_into()
            .map_err(|_| serde::de::Error::custom("key must be 32 bytes"))
    }
}

/// Fields supplied by the issuer when creating a lease.
///
/// The store assigns `id`, and every new lease starts ACTIVE.
#[derive(Debug, Clone)]
pub struct NewLease {
    pub key: Uuid,
    pub owner: String,
    pub holder: String,
    pub public_key: PublicKeyBytes,
    pub secret_key: SecretKeyBytes,
    pub created_at: DateTime<Utc>,
}

/// A lease record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub id: LeaseId,
    /// Opaque license key token.
    pub key: Uuid,
    pub owner: String,
    pub holder: String,
    pub public_key: PublicKeyBytes,
    pub secret_key: SecretKeyBytes,
    pub status: LeaseStatus,
    #[serde(with = "ts_format")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "ts_format_opt")]
    pub revoked_at: Option<DateTime<Utc>>,
    #[serde(with = "ts_format_opt")]
    pub last_checkin_at: Option<DateTime<Utc>>,
}

impl Lease {
    /// Materialize a freshly created lease.
    pub fn from_new(id: LeaseId, new: NewLease) -> Self {
        Self {
            id,
            key: new.key,
            owner: new.owner,
            holder: new.holder,
            public_key: new.public_key,
            secret_key: new.secret_key,
            status: LeaseStatus::Active,
            created_at: new.created_at,
            revoked_at: None,
            last_checkin_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == LeaseStatus::Active
    }

    /// Transition ACTIVE → REVOKED.
    ///
    /// Returns `false` (and leaves `revoked_at` untouched) when the lease is
    /// already revoked.
    pub fn revoke(&mut self, at: DateTime<Utc>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = LeaseStatus::Revoked;
        self.revoked_at = Some(at);
        true
    }

    /// Record a successful checkin.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_checkin_at = Some(at);
    }

    /// `revoked_at` is set iff the lease is revoked.
    pub fn is_consistent(&self) -> bool {
        self.revoked_at.is_some() == (self.status == LeaseStatus::Revoked)
    }
}
