//! Error types for cryptographic operations.

use thiserror::Error;

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur during key derivation or encryption.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The ciphertext failed its integrity check.
    ///
    /// This means the data was not produced with the given key: wrong
    /// password, wrong salt, or the bytes were corrupted or tampered with.
    #[error("authentication failed: ciphertext was not produced with this key")]
    Authentication,

    /// The ciphertext is shorter than a nonce plus an authentication tag.
    #[error("ciphertext too short: {len} bytes, need at least {min}")]
    TruncatedCiphertext {
        /// Length of the rejected input.
        len: usize,
        /// Minimum valid ciphertext length.
        min: usize,
    },

    /// A salt could not be constructed or parsed.
    #[error("invalid salt: {message}")]
    InvalidSalt {
        /// Description of the problem.
        message: String,
    },

    /// Key derivation parameters were invalid.
    #[error("key derivation failed: {message}")]
    KeyDerivation {
        /// Description of the problem.
        message: String,
    },

    /// The underlying AEAD rejected an encryption request.
    #[error("encryption failed")]
    Encryption,
}

impl CryptoError {
    /// Creates an invalid salt error.
    pub fn invalid_salt(message: impl Into<String>) -> Self {
        Self::InvalidSalt {
            message: message.into(),
        }
    }

    /// Creates a key derivation error.
    pub fn key_derivation(message: impl Into<String>) -> Self {
        Self::KeyDerivation {
            message: message.into(),
        }
    }
}
