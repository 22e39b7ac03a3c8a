//! # Checkin Challenges
//!
//! Each checkin carries a fresh 32-byte challenge sealed to the lease's
//! public key. The issuer opens it and echoes the plaintext; the holder
//! compares the echo with what it sent.

use std::fmt;

use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::keys::{ChallengePublicKey, ChallengeSecretKey};
use crate::sealed;
use crate::CryptoError;

/// Challenge length in bytes.
pub const CHALLENGE_LEN: usize = 32;

/// A single-use checkin challenge.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Challenge([u8; CHALLENGE_LEN]);

impl Challenge {
    /// Draw a fresh challenge from the OS RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; CHALLENGE_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; CHALLENGE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; CHALLENGE_LEN] {
        &self.0
    }
}

impl fmt::Debug for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Challenge({}..)", hex::encode(&self.0[..4]))
    }
}

/// Generate a challenge and seal it to `public_key`.
pub fn seal_challenge(
    public_key: &ChallengePublicKey,
) -> Result<(Challenge, Vec<u8>), CryptoError> {
    let challenge = Challenge::generate();
    let ciphertext = sealed::seal(public_key, challenge.as_bytes())?;
    Ok((challenge, ciphertext))
}

/// Open a sealed challenge.
///
/// A box that opens but does not hold exactly one challenge is reported as a
/// decryption failure.
pub fn open_challenge(
    secret_key: &ChallengeSecretKey,
    ciphertext: &[u8],
) -> Result<Challenge, CryptoError> {
    let plaintext = sealed::open(secret_key, ciphertext)?;
    let bytes: [u8; CHALLENGE_LEN] = plaintext.as_slice().try_into().map_err(|_| {
        CryptoError::DecryptionFailed(format!(
            "challenge must be {} bytes, got {}",
            CHALLENGE_LEN,
            plaintext.len()
        ))
    })?;
    Ok(Challenge(bytes))
}

/// Compare an echoed value with the challenge that was sent.
pub fn verify_echo(expected: &Challenge, echoed: &[u8]) -> Result<(), CryptoError> {
    if echoed.len() != CHALLENGE_LEN {
        return Err(CryptoError::ChallengeMismatch);
    }
    if bool::from(expected.0.ct_eq(echoed)) {
        Ok(())
    } else {
        Err(CryptoError::ChallengeMismatch)
    }
}
