//! Physical entry stores.
//!
//! Backends persist `(key, salt, ciphertext)` triples and expose identical
//! mapping semantics despite different durability and concurrency
//! characteristics. They are opaque byte stores: encryption, key
//! derivation, and value encoding all happen above them in
//! [`EncryptedMapping`](crate::EncryptedMapping).

mod dir;
mod sqlite;

pub use dir::DirBackend;
pub use sqlite::{SqliteBackend, SqliteOptions};

use crate::error::CoreResult;
use vaultmap_crypto::Salt;

/// A physical store for encrypted entries.
///
/// # Invariants
///
/// - Every live key has exactly one salt and one ciphertext, persisted
///   together (same file or same row).
/// - `put` is an upsert: it fully replaces any prior entry for the key and
///   leaves no orphaned physical entry behind.
/// - `get` returns exactly the salt and bytes previously stored for the key.
/// - Operations return only after the store confirms persistence.
pub trait EntryStore: Send + Sync {
    /// Persists an entry, replacing any prior entry for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    fn put(&mut self, key: &str, salt: &Salt, ciphertext: &[u8]) -> CoreResult<()>;

    /// Retrieves the salt and ciphertext stored for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::KeyNotFound`](crate::CoreError::KeyNotFound)
    /// if the key is absent.
    fn get(&self, key: &str) -> CoreResult<(Salt, Vec<u8>)>;

    /// Removes the entry for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::KeyNotFound`](crate::CoreError::KeyNotFound)
    /// if the key is absent.
    fn delete(&mut self, key: &str) -> CoreResult<()>;

    /// Reports whether an entry exists for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    fn contains(&self, key: &str) -> CoreResult<bool>;

    /// Lists all logical keys, in storage order (no ordering guarantee).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    fn keys(&self) -> CoreResult<Vec<String>>;

    /// Returns the number of live entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    fn len(&self) -> CoreResult<usize>;

    /// Reports whether the store holds no entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    fn is_empty(&self) -> CoreResult<bool> {
        Ok(self.len()? == 0)
    }
}
