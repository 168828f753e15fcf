//! Error types for mapping operations.

use std::io;
use thiserror::Error;

/// Result type for mapping operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in VaultMap operations.
///
/// Every error propagates to the caller; the engine performs no silent
/// retries and no automatic recovery. [`Authentication`](Self::Authentication)
/// is always distinguishable from [`KeyNotFound`](Self::KeyNotFound): a
/// wrong password never looks like a missing entry.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A password or salt could not be resolved at construction time, or
    /// a construction parameter was invalid.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// Lookup or delete on an absent logical key.
    #[error("key not found: {key}")]
    KeyNotFound {
        /// The logical key that was not found.
        key: String,
    },

    /// Decrypt-time integrity check failed: wrong password or a
    /// corrupted/tampered entry.
    #[error("authentication failed for key {key}: wrong password or corrupted entry")]
    Authentication {
        /// The logical key whose entry failed to decrypt.
        key: String,
    },

    /// Filesystem operation failed.
    #[error("storage error: {0}")]
    Io(#[from] io::Error),

    /// Embedded database operation failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The storage layer itself is corrupted: an entry filename that does
    /// not parse as a locator, or a persisted salt of the wrong length.
    #[error("storage corrupted: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
    },

    /// Value encoding or decoding failed.
    #[error("encoding error: {message}")]
    Encoding {
        /// Description of the failure.
        message: String,
    },

    /// Internal cryptographic failure outside of decrypt authentication.
    #[error("crypto error: {0}")]
    Crypto(#[from] vaultmap_crypto::CryptoError),
}

impl CoreError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a key not found error.
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    /// Creates an authentication error.
    pub fn authentication(key: impl Into<String>) -> Self {
        Self::Authentication { key: key.into() }
    }

    /// Creates a storage corruption error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted {
            message: message.into(),
        }
    }

    /// Creates an encoding error.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }
}
