//! # Sealed Box
//!
//! Authenticated public-key encryption (ECIES shape):
//!
//! ```text
//! ephemeral X25519 ──ECDH──→ shared ──HKDF-SHA256──→ k ──XChaCha20-Poly1305──→ ct
//!
//! wire = eph_pub (32) || nonce (24) || ct || tag (16)
//! ```
//!
//! Both public keys are bound as associated data, so a box sealed for one
//! lease cannot be opened under another lease's key.

use hkdf::Hkdf;
use sha2::Sha256;
use x25519_dalek::{EphemeralSecret, PublicKey};
use zeroize::Zeroize;

use crate::keys::{ChallengePublicKey, ChallengeSecretKey, KEY_LEN};
use crate::symmetric::{self, Nonce, SecretKey, NONCE_LEN, TAG_LEN};
use crate::CryptoError;

/// Bytes added to the plaintext by sealing.
pub const SEALED_OVERHEAD: usize = KEY_LEN + NONCE_LEN + TAG_LEN;

const KDF_INFO: &[u8] = b"lease-checkin-sealed-box-v1";

/// Seal `plaintext` so only the holder of `recipient`'s secret key can open it.
pub fn seal(recipient: &ChallengePublicKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let ephemeral = EphemeralSecret::random_from_rng(rand::rngs::OsRng);
    let ephemeral_pub = PublicKey::from(&ephemeral);

    let shared = ephemeral.diffie_hellman(&recipient.to_dalek());
    if !shared.was_contributory() {
        return Err(CryptoError::InvalidPublicKey);
    }

    let aad = binding(ephemeral_pub.as_bytes(), recipient.as_bytes());
    let key = derive_key(shared.as_bytes(), &aad)?;
    let (ciphertext, nonce) = symmetric::encrypt(&key, plaintext, &aad)?;

    let mut out = Vec::with_capacity(SEALED_OVERHEAD + plaintext.len());
    out.extend_from_slice(ephemeral_pub.as_bytes());
    out.extend_from_slice(nonce.as_bytes());
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Open a sealed box with the recipient's secret key.
pub fn open(recipient: &ChallengeSecretKey, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if sealed.len() < SEALED_OVERHEAD {
        return Err(CryptoError::DecryptionFailed(format!(
            "sealed box too short: {} bytes",
            sealed.len()
        )));
    }

    let (eph_bytes, rest) = sealed.split_at(KEY_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let mut eph = [0u8; KEY_LEN];
    eph.copy_from_slice(eph_bytes);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(nonce_bytes);

    let ephemeral_pub = PublicKey::from(eph);
    let shared = recipient.to_dalek().diffie_hellman(&ephemeral_pub);
    if !shared.was_contributory() {
        return Err(CryptoError::DecryptionFailed(
            "non-contributory ephemeral key".into(),
        ));
    }

    let recipient_pub = recipient.public_key();
    let aad = binding(&eph, recipient_pub.as_bytes());
    let key = derive_key(shared.as_bytes(), &aad)?;
    symmetric::decrypt(&key, ciphertext, &Nonce::from_bytes(nonce), &aad)
}

fn binding(ephemeral: &[u8; KEY_LEN], recipient: &[u8; KEY_LEN]) -> [u8; 2 * KEY_LEN] {
    let mut out = [0u8; 2 * KEY_LEN];
    out[..KEY_LEN].copy_from_slice(ephemeral);
    out[KEY_LEN..].copy_from_slice(recipient);
    out
}

fn derive_key(shared: &[u8; 32], salt: &[u8]) -> Result<SecretKey, CryptoError> {
    let hk = Hkdf::<Sha256>::new(Some(salt), shared);
    let mut okm = [0u8; 32];
    hk.expand(KDF_INFO, &mut okm)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    let key = SecretKey::from_bytes(okm);
    okm.zeroize();
    Ok(key)
}
