//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Ciphertext could not be opened (corrupt, truncated, or wrong key)
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Ciphertext opened correctly but carried a different challenge
    #[error("Challenge mismatch")]
    ChallengeMismatch,

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Public key is a low-order point
    #[error("Invalid public key")]
    InvalidPublicKey,
}
