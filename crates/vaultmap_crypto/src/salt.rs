//! Entry salts.
//!
//! A salt decorrelates key derivation across entries: two entries holding
//! the same plaintext under different salts produce unrelated ciphertexts.
//! Salts are not secret - they are stored next to the ciphertext (in the
//! filename or the database row) and recovered on read.

use crate::error::{CryptoError, CryptoResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;

/// Fixed salt length in bytes.
pub const SALT_SIZE: usize = 64;

/// A fixed-length salt mixed into key derivation.
#[derive(Clone, PartialEq, Eq)]
pub struct Salt {
    bytes: [u8; SALT_SIZE],
}

impl Salt {
    /// Generates a fresh cryptographically random salt.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; SALT_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Returns the all-zero salt used by no-encryption mappings.
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            bytes: [0u8; SALT_SIZE],
        }
    }

    /// Creates a salt from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice is not exactly [`SALT_SIZE`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != SALT_SIZE {
            return Err(CryptoError::invalid_salt(format!(
                "expected {SALT_SIZE} bytes, got {}",
                bytes.len()
            )));
        }
        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(bytes);
        Ok(Self { bytes: salt })
    }

    /// Parses a salt from its URL-safe base64 form (no padding).
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid base64 or does not
    /// decode to exactly [`SALT_SIZE`] bytes.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| CryptoError::invalid_salt(format!("base64 decode failed: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Encodes the salt as URL-safe base64 without padding.
    ///
    /// The result is safe to embed in a filename.
    #[must_use]
    pub fn to_base64(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.bytes)
    }

    /// Returns the raw salt bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Salt").field(&self.to_base64()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_random() {
        let a = Salt::generate();
        let b = Salt::generate();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn base64_round_trip() {
        let salt = Salt::generate();
        let encoded = salt.to_base64();
        let decoded = Salt::from_base64(&encoded).unwrap();
        assert_eq!(salt, decoded);
    }

    #[test]
    fn encoding_has_no_dot() {
        // The locator format in vaultmap_core relies on '.' never
        // appearing in the base64url alphabet.
        let salt = Salt::generate();
        assert!(!salt.to_base64().contains('.'));
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(Salt::from_bytes(&[0u8; 16]).is_err());
        assert!(Salt::from_bytes(&[0u8; SALT_SIZE + 1]).is_err());
    }

    #[test]
    fn bad_base64_rejected() {
        let result = Salt::from_base64("not!valid!base64!");
        assert!(matches!(result, Err(CryptoError::InvalidSalt { .. })));
    }

    #[test]
    fn zeroed_is_all_zero() {
        assert_eq!(Salt::zeroed().as_bytes(), &[0u8; SALT_SIZE]);
    }
}
