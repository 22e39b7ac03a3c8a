//! # Lease Key Pairs
//!
//! X25519 key pair generated by the issuer at grant time. The public half is
//! handed to the holder; the secret half never leaves the issuer.

use std::fmt;

use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroize;

use crate::CryptoError;

/// Key length in bytes.
pub const KEY_LEN: usize = 32;

/// X25519 public key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ChallengePublicKey([u8; KEY_LEN]);

impl ChallengePublicKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse from a slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; KEY_LEN] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: KEY_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    pub(crate) fn to_dalek(self) -> PublicKey {
        PublicKey::from(self.0)
    }
}

impl fmt::Debug for ChallengePublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChallengePublicKey({})", hex::encode(self.0))
    }
}

/// X25519 secret key. Zeroized on drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct ChallengeSecretKey([u8; KEY_LEN]);

impl ChallengeSecretKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(&self) -> [u8; KEY_LEN] {
        self.0
    }

    /// Derive the matching public key.
    pub fn public_key(&self) -> ChallengePublicKey {
        let secret = StaticSecret::from(self.0);
        ChallengePublicKey(PublicKey::from(&secret).to_bytes())
    }

    pub(crate) fn to_dalek(&self) -> StaticSecret {
        StaticSecret::from(self.0)
    }
}

impl fmt::Debug for ChallengeSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChallengeSecretKey(<redacted>)")
    }
}

/// Lease key pair.
#[derive(Clone, Debug)]
pub struct ChallengeKeyPair {
    secret: ChallengeSecretKey,
    public: ChallengePublicKey,
}

impl ChallengeKeyPair {
    /// Generate a fresh key pair from the OS RNG.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(rand::rngs::OsRng);
        let public = PublicKey::from(&secret);
        Self {
            secret: ChallengeSecretKey(secret.to_bytes()),
            public: ChallengePublicKey(public.to_bytes()),
        }
    }

    /// Rebuild from a persisted secret key.
    pub fn from_secret(secret: ChallengeSecretKey) -> Self {
        let public = secret.public_key();
        Self { secret, public }
    }

    pub fn public_key(&self) -> ChallengePublicKey {
        self.public
    }

    pub fn secret_key(&self) -> &ChallengeSecretKey {
        &self.secret
    }
}
