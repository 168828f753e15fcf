//! Authenticated encryption using AES-256-GCM.
//!
//! Output layout: `nonce (12 bytes) || ciphertext || tag (16 bytes)`.
//! A fresh random nonce is generated per encryption, so encrypting the
//! same plaintext twice never produces the same bytes. The GCM tag makes
//! decryption fail closed on a wrong key or corrupted data.

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::DerivedKey;
use aes_gcm::{
    aead::{generic_array::GenericArray, Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;

/// Size of the GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;
/// Size of the GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// An AES-256-GCM cipher bound to one derived key.
pub struct Cipher {
    inner: Aes256Gcm,
}

impl Cipher {
    /// Creates a cipher from a derived key.
    #[must_use]
    pub fn new(key: &DerivedKey) -> Self {
        // DerivedKey is always exactly KEY_SIZE (32) bytes, matching
        // AES-256's key size, so this conversion is infallible.
        let key_array = GenericArray::from_slice(key.as_bytes());
        Self {
            inner: Aes256Gcm::new(key_array),
        }
    }

    /// Encrypts a plaintext, prepending the random nonce.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying AEAD rejects the input.
    pub fn encrypt(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .inner
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptoError::Encryption)?;

        let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend(ciphertext);
        Ok(result)
    }

    /// Decrypts data produced by [`encrypt`](Self::encrypt).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Authentication`] if the data was not
    /// produced with this key or was modified, and
    /// [`CryptoError::TruncatedCiphertext`] if the input is too short to
    /// contain a nonce and tag.
    pub fn decrypt(&self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        let min = NONCE_SIZE + TAG_SIZE;
        if ciphertext.len() < min {
            return Err(CryptoError::TruncatedCiphertext {
                len: ciphertext.len(),
                min,
            });
        }

        let nonce = Nonce::from_slice(&ciphertext[..NONCE_SIZE]);
        let encrypted = &ciphertext[NONCE_SIZE..];

        self.inner
            .decrypt(nonce, encrypted)
            .map_err(|_| CryptoError::Authentication)
    }
}

impl std::fmt::Debug for Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cipher").field("inner", &"Aes256Gcm").finish()
    }
}
