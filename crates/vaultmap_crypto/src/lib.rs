//! # VaultMap Crypto
//!
//! Key derivation and authenticated encryption for VaultMap.
//!
//! This crate provides the pure cryptographic building blocks of the
//! mapping engine. Nothing here performs I/O - salts, keys, and
//! ciphertexts are plain byte values that the storage layer persists.
//!
//! ## Security Model
//!
//! - Keys are derived from passwords with PBKDF2-HMAC-SHA256
//! - Encryption uses AES-256-GCM with a unique nonce per operation
//! - Ciphertext layout: `nonce (12 bytes) || ciphertext || tag (16 bytes)`
//! - Tampering or a wrong key is detected on decrypt and fails closed
//! - Derived keys are zeroized on drop
//!
//! ## Example
//!
//! ```rust
//! use vaultmap_crypto::{derive_key, Cipher, Salt};
//!
//! let salt = Salt::generate();
//! let key = derive_key(b"my password", &salt, 10_000).unwrap();
//! let cipher = Cipher::new(&key);
//!
//! let ciphertext = cipher.encrypt(b"secret").unwrap();
//! let plaintext = cipher.decrypt(&ciphertext).unwrap();
//! assert_eq!(&plaintext, b"secret");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cipher;
mod error;
mod kdf;
mod salt;

pub use cipher::{Cipher, NONCE_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use kdf::{derive_key, DerivedKey, DEFAULT_ITERATIONS, KEY_SIZE};
pub use salt::{Salt, SALT_SIZE};
