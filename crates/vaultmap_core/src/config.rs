//! Mapping configuration and secret resolution.
//!
//! Secrets follow an explicit resolution order: explicit argument, then
//! the named environment variable, then a configuration error. Resolution
//! happens once, at mapping construction - never inside deep call paths.

use crate::error::{CoreError, CoreResult};
use std::env;
use vaultmap_crypto::{Salt, DEFAULT_ITERATIONS};
use zeroize::Zeroizing;

/// Environment variable consulted when no explicit password is given.
pub const PASSWORD_ENV: &str = "VAULTMAP_PASSWORD";

/// Environment variable consulted when no explicit static salt is given.
pub const SALT_ENV: &str = "VAULTMAP_SALT";

/// How salts are assigned to entries.
#[derive(Debug, Clone)]
pub enum SaltPolicy {
    /// A fresh random salt per write, stored alongside the entry and
    /// recovered from it on read. Costs one key derivation per operation.
    PerEntry,

    /// One salt shared by every entry. Faster (the derived key is cached)
    /// but weaker: compromise of one entry's key threatens all entries.
    Static(Salt),
}

impl SaltPolicy {
    /// Resolves a static salt: explicit base64 string first, then the
    /// [`SALT_ENV`] environment variable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if neither source is available or
    /// the value does not decode to a valid salt.
    pub fn static_resolved(explicit: Option<&str>) -> CoreResult<Self> {
        let encoded = match explicit {
            Some(value) => value.to_owned(),
            None => env::var(SALT_ENV).map_err(|_| {
                CoreError::configuration(format!(
                    "no static salt provided and {SALT_ENV} is unset"
                ))
            })?,
        };

        let salt = Salt::from_base64(&encoded)
            .map_err(|e| CoreError::configuration(format!("static salt: {e}")))?;
        Ok(Self::Static(salt))
    }
}

/// Configuration for constructing an [`EncryptedMapping`](crate::EncryptedMapping).
#[derive(Clone)]
pub struct MappingConfig {
    pub(crate) password: Option<Zeroizing<String>>,
    pub(crate) iterations: u32,
    pub(crate) salt_policy: SaltPolicy,
}

impl MappingConfig {
    /// Creates a configuration with default values: password from the
    /// environment, [`DEFAULT_ITERATIONS`], per-entry salts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            password: None,
            iterations: DEFAULT_ITERATIONS,
            salt_policy: SaltPolicy::PerEntry,
        }
    }

    /// Sets an explicit password, bypassing the environment fallback.
    ///
    /// The password is held in a zeroizing buffer from this point on, so
    /// dropped or cloned configurations leave no plaintext copies behind.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Zeroizing::new(password.into()));
        self
    }

    /// Sets the PBKDF2 iteration count.
    ///
    /// This is the dominant contributor to encrypted read/write latency;
    /// lower it only when the threat model allows.
    #[must_use]
    pub const fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the salt policy.
    #[must_use]
    pub fn salt_policy(mut self, policy: SaltPolicy) -> Self {
        self.salt_policy = policy;
        self
    }

    /// Resolves the password: explicit value first, then [`PASSWORD_ENV`].
    pub(crate) fn resolve_password(&self) -> CoreResult<Zeroizing<Vec<u8>>> {
        match &self.password {
            Some(password) => Ok(Zeroizing::new(password.as_bytes().to_vec())),
            None => match env::var(PASSWORD_ENV) {
                Ok(password) => Ok(Zeroizing::new(password.into_bytes())),
                Err(_) => Err(CoreError::configuration(format!(
                    "no password provided and {PASSWORD_ENV} is unset"
                ))),
            },
        }
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MappingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingConfig")
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("iterations", &self.iterations)
            .field("salt_policy", &self.salt_policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = MappingConfig::new();
        assert!(config.password.is_none());
        assert_eq!(config.iterations, DEFAULT_ITERATIONS);
        assert!(matches!(config.salt_policy, SaltPolicy::PerEntry));
    }

    #[test]
    fn builder_pattern() {
        let config = MappingConfig::new().password("pw").iterations(1_000);
        assert_eq!(config.password.as_ref().map(|p| p.as_str()), Some("pw"));
        assert_eq!(config.iterations, 1_000);
    }

    #[test]
    fn explicit_password_wins() {
        let config = MappingConfig::new().password("explicit");
        let resolved = config.resolve_password().unwrap();
        assert_eq!(resolved.as_slice(), b"explicit");
    }

    #[test]
    fn password_is_held_in_zeroizing_buffer() {
        // The unresolved password must already live in a zeroizing
        // buffer, matching the hygiene of the resolved byte buffer.
        let config = MappingConfig::new().password("hunter2");
        let held: &Zeroizing<String> = config.password.as_ref().unwrap();
        assert_eq!(held.as_str(), "hunter2");
    }

    #[test]
    fn explicit_static_salt_resolves() {
        let salt = Salt::generate();
        let policy = SaltPolicy::static_resolved(Some(&salt.to_base64())).unwrap();
        match policy {
            SaltPolicy::Static(resolved) => assert_eq!(resolved, salt),
            SaltPolicy::PerEntry => panic!("expected static policy"),
        }
    }

    #[test]
    fn malformed_static_salt_rejected() {
        let result = SaltPolicy::static_resolved(Some("too short"));
        assert!(matches!(result, Err(CoreError::Configuration { .. })));
    }

    #[test]
    fn debug_redacts_password() {
        let config = MappingConfig::new().password("hunter2");
        let printed = format!("{config:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("REDACTED"));
    }
}
