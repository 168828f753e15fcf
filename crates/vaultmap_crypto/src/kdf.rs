//! Password-based key derivation.
//!
//! Passwords are stretched into fixed-length AES keys with
//! PBKDF2-HMAC-SHA256. The iteration count is the dominant cost of every
//! encrypted read and write, so it is an explicit parameter rather than a
//! hidden constant; [`DEFAULT_ITERATIONS`] keeps per-operation latency in
//! the tens-of-milliseconds range on current hardware.

use crate::error::{CryptoError, CryptoResult};
use crate::salt::Salt;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of the derived AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// A symmetric key derived from a password and salt.
///
/// The key is automatically zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Returns the key as a byte slice.
    ///
    /// # Security
    ///
    /// Be careful with this method - don't log or serialize the result.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derives a key from a password and salt using PBKDF2-HMAC-SHA256.
///
/// Deterministic: the same `(password, salt, iterations)` triple always
/// yields the same key.
///
/// # Errors
///
/// Returns an error if `iterations` is zero.
pub fn derive_key(password: &[u8], salt: &Salt, iterations: u32) -> CryptoResult<DerivedKey> {
    if iterations == 0 {
        return Err(CryptoError::key_derivation(
            "iteration count must be non-zero",
        ));
    }

    let mut bytes = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(password, salt.as_bytes(), iterations, &mut bytes);
    Ok(DerivedKey { bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low iteration count to keep tests fast; production uses
    // DEFAULT_ITERATIONS.
    const TEST_ITERATIONS: u32 = 16;

    #[test]
    fn derivation_is_deterministic() {
        let salt = Salt::generate();
        let a = derive_key(b"password", &salt, TEST_ITERATIONS).unwrap();
        let b = derive_key(b"password", &salt, TEST_ITERATIONS).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_salt_different_key() {
        let a = derive_key(b"password", &Salt::generate(), TEST_ITERATIONS).unwrap();
        let b = derive_key(b"password", &Salt::generate(), TEST_ITERATIONS).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_password_different_key() {
        let salt = Salt::generate();
        let a = derive_key(b"password_a", &salt, TEST_ITERATIONS).unwrap();
        let b = derive_key(b"password_b", &salt, TEST_ITERATIONS).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_iterations_different_key() {
        let salt = Salt::generate();
        let a = derive_key(b"password", &salt, TEST_ITERATIONS).unwrap();
        let b = derive_key(b"password", &salt, TEST_ITERATIONS + 1).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn zero_iterations_rejected() {
        let salt = Salt::generate();
        let result = derive_key(b"password", &salt, 0);
        assert!(matches!(result, Err(CryptoError::KeyDerivation { .. })));
    }

    #[test]
    fn empty_password_is_allowed() {
        let salt = Salt::generate();
        let key = derive_key(b"", &salt, TEST_ITERATIONS).unwrap();
        assert_eq!(key.as_bytes().len(), KEY_SIZE);
    }

    #[test]
    fn debug_is_redacted() {
        let salt = Salt::generate();
        let key = derive_key(b"secret", &salt, TEST_ITERATIONS).unwrap();
        let printed = format!("{key:?}");
        assert!(printed.contains("REDACTED"));
    }
}
