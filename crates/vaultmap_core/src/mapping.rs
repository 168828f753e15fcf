//! The encrypted mapping façade.
//!
//! [`EncryptedMapping`] combines a salt policy, key derivation, the
//! cipher, a value codec, and a backend into standard mutable-mapping
//! operations. Every operation is synchronous and returns only after the
//! backend confirms persistence.

use crate::backend::EntryStore;
use crate::codec::EntryCodec;
use crate::config::{MappingConfig, SaltPolicy};
use crate::error::{CoreError, CoreResult};
use tracing::debug;
use vaultmap_crypto::{derive_key, Cipher, CryptoError, Salt};
use zeroize::Zeroizing;

/// Salt handling plus key material for one mapping instance.
enum KeyEngine {
    /// Fresh salt and key derivation on every write; the salt is
    /// recovered from the entry on read.
    PerEntry {
        password: Zeroizing<Vec<u8>>,
        iterations: u32,
    },
    /// One shared salt; the derived cipher is computed once and cached.
    Static {
        password: Zeroizing<Vec<u8>>,
        iterations: u32,
        salt: Salt,
        cipher: Cipher,
    },
    /// No encryption: stored bytes are the encoded value, salts are a
    /// fixed all-zero placeholder.
    Plain,
}

/// A persistent, optionally encrypted key-value mapping.
///
/// Generic over the value codec and the physical backend; file and SQLite
/// backends expose identical mapping semantics through this façade.
///
/// # Example
///
/// ```no_run
/// use vaultmap_core::{DirBackend, EncryptedMapping, MappingConfig, Utf8Codec};
///
/// let backend = DirBackend::open("t1")?;
/// let config = MappingConfig::new().password("pw");
/// let mut vault = EncryptedMapping::new(backend, Utf8Codec, config)?;
///
/// vault.set("x", &"hello".to_string())?;
/// assert_eq!(vault.get("x")?, "hello");
/// # Ok::<(), vaultmap_core::CoreError>(())
/// ```
pub struct EncryptedMapping<C: EntryCodec, S: EntryStore> {
    store: S,
    codec: C,
    engine: KeyEngine,
}

impl<C: EntryCodec, S: EntryStore> EncryptedMapping<C, S> {
    /// Constructs an encrypted mapping over a backend.
    ///
    /// Resolves the password (explicit value, then the environment) and,
    /// under a static salt policy, derives the shared key once.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] if no password can be
    /// resolved or the iteration count is zero.
    pub fn new(store: S, codec: C, config: MappingConfig) -> CoreResult<Self> {
        if config.iterations == 0 {
            return Err(CoreError::configuration(
                "iteration count must be non-zero",
            ));
        }
        let password = config.resolve_password()?;

        let engine = match config.salt_policy {
            SaltPolicy::PerEntry => KeyEngine::PerEntry {
                password,
                iterations: config.iterations,
            },
            SaltPolicy::Static(salt) => {
                let key = derive_key(&password, &salt, config.iterations)?;
                KeyEngine::Static {
                    password,
                    iterations: config.iterations,
                    salt,
                    cipher: Cipher::new(&key),
                }
            }
        };

        Ok(Self {
            store,
            codec,
            engine,
        })
    }

    /// Constructs a mapping that stores encoded values without
    /// encryption.
    ///
    /// This is the same code path as the encrypted mapping with a no-op
    /// cipher and a fixed placeholder salt, not a separate
    /// implementation.
    #[must_use]
    pub fn plaintext(store: S, codec: C) -> Self {
        Self {
            store,
            codec,
            engine: KeyEngine::Plain,
        }
    }

    /// Retrieves and decrypts the value stored under `key`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::KeyNotFound`] if the key is absent.
    /// - [`CoreError::Authentication`] if the entry was written with a
    ///   different password or has been corrupted.
    /// - [`CoreError::Encoding`] if the decrypted bytes fail to decode.
    pub fn get(&self, key: &str) -> CoreResult<C::Value> {
        let (salt, stored) = self.store.get(key)?;

        let plaintext = match &self.engine {
            KeyEngine::Plain => stored,
            KeyEngine::PerEntry {
                password,
                iterations,
            } => {
                let derived = derive_key(password, &salt, *iterations)?;
                Cipher::new(&derived)
                    .decrypt(&stored)
                    .map_err(|e| decrypt_error(key, e))?
            }
            KeyEngine::Static {
                password,
                iterations,
                salt: static_salt,
                cipher,
            } => {
                // An entry can carry a salt other than the configured one
                // (written before the static salt changed, or by a
                // per-entry mapping over the same storage); honor what is
                // stored.
                if salt == *static_salt {
                    cipher.decrypt(&stored).map_err(|e| decrypt_error(key, e))?
                } else {
                    let derived = derive_key(password, &salt, *iterations)?;
                    Cipher::new(&derived)
                        .decrypt(&stored)
                        .map_err(|e| decrypt_error(key, e))?
                }
            }
        };

        self.codec.decode(&plaintext)
    }

    /// Encrypts and persists a value under `key`, creating the entry or
    /// fully replacing it.
    ///
    /// Under the per-entry salt policy every write generates a fresh
    /// salt; an old salt is never reused with new plaintext.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding, encryption, or persistence fails.
    pub fn set(&mut self, key: &str, value: &C::Value) -> CoreResult<()> {
        let encoded = self.codec.encode(value)?;

        let (salt, stored) = match &self.engine {
            KeyEngine::Plain => (Salt::zeroed(), encoded),
            KeyEngine::PerEntry {
                password,
                iterations,
            } => {
                let salt = Salt::generate();
                let derived = derive_key(password, &salt, *iterations)?;
                let ciphertext = Cipher::new(&derived).encrypt(&encoded)?;
                (salt, ciphertext)
            }
            KeyEngine::Static { salt, cipher, .. } => {
                (salt.clone(), cipher.encrypt(&encoded)?)
            }
        };

        self.store.put(key, &salt, &stored)?;
        debug!(key, "set value");
        Ok(())
    }

    /// Removes the entry for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::KeyNotFound`] if the key is absent.
    pub fn delete(&mut self, key: &str) -> CoreResult<()> {
        self.store.delete(key)
    }

    /// Reports whether an entry exists for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend lookup fails.
    pub fn contains(&self, key: &str) -> CoreResult<bool> {
        self.store.contains(key)
    }

    /// Lists all logical keys (order unspecified).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend enumeration fails.
    pub fn keys(&self) -> CoreResult<Vec<String>> {
        self.store.keys()
    }

    /// Returns the number of entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend count fails.
    pub fn len(&self) -> CoreResult<usize> {
        self.store.len()
    }

    /// Reports whether the mapping holds no entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend count fails.
    pub fn is_empty(&self) -> CoreResult<bool> {
        self.store.is_empty()
    }

    /// Returns a reference to the underlying backend.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Maps a decrypt-time crypto failure onto the mapping error taxonomy.
///
/// Authentication and truncation both mean "not produced with this key or
/// damaged" and must never be mistaken for a missing key.
fn decrypt_error(key: &str, err: CryptoError) -> CoreError {
    match err {
        CryptoError::Authentication | CryptoError::TruncatedCiphertext { .. } => {
            CoreError::authentication(key)
        }
        other => CoreError::Crypto(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DirBackend;
    use crate::codec::Utf8Codec;
    use tempfile::tempdir;

    const TEST_ITERATIONS: u32 = 16;

    fn per_entry_config() -> MappingConfig {
        MappingConfig::new()
            .password("pw")
            .iterations(TEST_ITERATIONS)
    }

    #[test]
    fn zero_iterations_rejected_at_construction() {
        let temp = tempdir().unwrap();
        let backend = DirBackend::open(temp.path().join("d")).unwrap();

        let result =
            EncryptedMapping::new(backend, Utf8Codec, per_entry_config().iterations(0));
        assert!(matches!(result, Err(CoreError::Configuration { .. })));
    }

    #[test]
    fn plaintext_mapping_stores_encoded_bytes_verbatim() {
        let temp = tempdir().unwrap();
        let backend = DirBackend::open(temp.path().join("d")).unwrap();
        let mut mapping = EncryptedMapping::plaintext(backend, Utf8Codec);

        mapping.set("k", &"visible".to_string()).unwrap();

        let (salt, stored) = mapping.store().get("k").unwrap();
        assert_eq!(salt, Salt::zeroed());
        assert_eq!(stored, b"visible");
        assert_eq!(mapping.get("k").unwrap(), "visible");
    }

    #[test]
    fn per_entry_overwrite_generates_new_salt() {
        let temp = tempdir().unwrap();
        let backend = DirBackend::open(temp.path().join("d")).unwrap();
        let mut mapping =
            EncryptedMapping::new(backend, Utf8Codec, per_entry_config()).unwrap();

        mapping.set("k", &"v1".to_string()).unwrap();
        let (salt1, _) = mapping.store().get("k").unwrap();

        mapping.set("k", &"v2".to_string()).unwrap();
        let (salt2, _) = mapping.store().get("k").unwrap();

        assert_ne!(salt1, salt2);
        assert_eq!(mapping.get("k").unwrap(), "v2");
    }

    #[test]
    fn static_policy_shares_one_salt() {
        let temp = tempdir().unwrap();
        let backend = DirBackend::open(temp.path().join("d")).unwrap();

        let static_salt = Salt::generate();
        let config = per_entry_config()
            .salt_policy(SaltPolicy::Static(static_salt.clone()));
        let mut mapping = EncryptedMapping::new(backend, Utf8Codec, config).unwrap();

        mapping.set("a", &"1".to_string()).unwrap();
        mapping.set("b", &"2".to_string()).unwrap();

        let (salt_a, _) = mapping.store().get("a").unwrap();
        let (salt_b, _) = mapping.store().get("b").unwrap();
        assert_eq!(salt_a, static_salt);
        assert_eq!(salt_b, static_salt);
    }

    #[test]
    fn static_mapping_reads_per_entry_salts() {
        // Entries written under per-entry policy stay readable when the
        // same storage is reopened with a static policy: reads honor the
        // stored salt.
        let temp = tempdir().unwrap();
        let dir = temp.path().join("d");

        {
            let backend = DirBackend::open(&dir).unwrap();
            let mut mapping =
                EncryptedMapping::new(backend, Utf8Codec, per_entry_config()).unwrap();
            mapping.set("k", &"written per-entry".to_string()).unwrap();
        }

        let backend = DirBackend::open(&dir).unwrap();
        let config = per_entry_config()
            .salt_policy(SaltPolicy::Static(Salt::generate()));
        let mapping = EncryptedMapping::new(backend, Utf8Codec, config).unwrap();

        assert_eq!(mapping.get("k").unwrap(), "written per-entry");
    }
}
