//! # Lease Crypto - Challenge Codec
//!
//! Proof-of-possession exchange used by lease checkins.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `keys` | X25519 | Per-lease key pair, public half handed to the holder |
//! | `symmetric` | XChaCha20-Poly1305 | AEAD inside the sealed box |
//! | `sealed` | X25519 + HKDF-SHA256 + XChaCha20-Poly1305 | Authenticated public-key encryption |
//! | `challenge` | 32 random bytes | Fresh challenge per checkin, echo verification |
//!
//! ## Exchange
//!
//! ```text
//! Holder                                   Issuer
//!   │ challenge = random(32)                 │
//!   │ ct = seal(lease.public_key, challenge) │
//!   │ ─────────────── ct ──────────────────→ │ echo = open(lease.secret_key, ct)
//!   │ ←────────────── echo ───────────────── │
//!   │ verify_echo(challenge, echo)           │
//! ```
//!
//! A failure to open the box (`CryptoError::DecryptionFailed`) is distinct
//! from a correctly opened box carrying the wrong value
//! (`CryptoError::ChallengeMismatch`).

#![warn(clippy::all)]

pub mod challenge;
pub mod errors;
pub mod keys;
pub mod sealed;
pub mod symmetric;

pub use challenge::{open_challenge, seal_challenge, verify_echo, Challenge, CHALLENGE_LEN};
pub use errors::CryptoError;
pub use keys::{ChallengeKeyPair, ChallengePublicKey, ChallengeSecretKey};
pub use sealed::{open, seal, SEALED_OVERHEAD};
