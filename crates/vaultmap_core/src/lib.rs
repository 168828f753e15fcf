//! # VaultMap Core
//!
//! A persistent, encrypted key-value mapping: a mutable dictionary whose
//! entries survive process restarts, persisted either as one file per
//! entry in a directory ([`DirBackend`]) or as rows in an embedded SQLite
//! table ([`SqliteBackend`]), optionally encrypted at rest with a
//! password-derived key.
//!
//! ## Design
//!
//! - Backends are opaque entry stores: they persist `(key, salt,
//!   ciphertext)` triples and know nothing about encryption or value
//!   types (see [`EntryStore`]).
//! - [`EncryptedMapping`] is the façade that combines a salt policy, key
//!   derivation, the cipher, a value codec, and a backend.
//! - All operations are synchronous and return only after the backend
//!   confirms persistence. There is no write-back caching.
//!
//! ## Example
//!
//! ```no_run
//! use vaultmap_core::{DirBackend, EncryptedMapping, MappingConfig, Utf8Codec};
//!
//! let backend = DirBackend::open("my_vault")?;
//! let config = MappingConfig::new().password("my secret");
//! let mut vault = EncryptedMapping::new(backend, Utf8Codec, config)?;
//!
//! vault.set("greeting", &"hello".to_string())?;
//! assert_eq!(vault.get("greeting")?, "hello");
//! # Ok::<(), vaultmap_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod mapping;

pub use backend::{DirBackend, EntryStore, SqliteBackend, SqliteOptions};
pub use codec::{BytesCodec, EntryCodec, FnCodec, Utf8Codec};
pub use config::{MappingConfig, SaltPolicy, PASSWORD_ENV, SALT_ENV};
pub use error::{CoreError, CoreResult};
pub use mapping::EncryptedMapping;

pub use vaultmap_crypto as crypto;
