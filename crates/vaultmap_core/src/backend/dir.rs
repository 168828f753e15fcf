//! File-per-entry backend.
//!
//! Each entry lives in its own regular file inside a dedicated directory:
//!
//! ```text
//! <dir>/
//! ├─ <b64url(key)>.<b64url(salt)>   # one file per live entry
//! └─ .<b64url(key)>.tmp             # transient, present only mid-write
//! ```
//!
//! The filename is the entry's locator: the logical key and its salt, each
//! URL-safe base64 encoded without padding, joined by a single `.`. The
//! base64url alphabet cannot produce `.`, so the split is unambiguous for
//! every possible key - no reserved substring can desynchronize it.
//!
//! Writes go to a hidden temp file which is fsynced and renamed into
//! place before the previous entry file is removed, so the old entry
//! survives a crash until the new one is durably on disk.

use crate::backend::EntryStore;
use crate::error::{CoreError, CoreResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use vaultmap_crypto::Salt;

/// Separates the key part from the salt part in an entry filename.
const LOCATOR_DELIMITER: char = '.';
/// Suffix of in-progress write files.
const TMP_SUFFIX: &str = ".tmp";

/// A backend that persists one entry per file in a directory.
///
/// The directory is created on open if it does not exist. The directory
/// handle is owned exclusively by one mapping instance for its lifetime.
#[derive(Debug)]
pub struct DirBackend {
    dir: PathBuf,
}

impl DirBackend {
    /// Opens or creates the entry directory, removing any temp files a
    /// previous interrupted write left behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or read.
    pub fn open(dir: impl Into<PathBuf>) -> CoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let backend = Self { dir };
        backend.remove_stale_temp_files()?;
        Ok(backend)
    }

    /// Removes temp files left behind by a write interrupted between
    /// creation and rename. The entry they were replacing is still intact,
    /// so dropping them loses nothing.
    fn remove_stale_temp_files(&self) -> CoreResult<()> {
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if let Some(name) = name.to_str() {
                if name.starts_with('.') && name.ends_with(TMP_SUFFIX) {
                    debug!(file = name, "removing stale temp file");
                    fs::remove_file(entry.path())?;
                }
            }
        }
        Ok(())
    }

    /// Returns the path to the entry directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Exports the entire entry directory to a gzip'd tar archive at
    /// `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be written.
    pub fn export_archive(&self, dest: &Path) -> CoreResult<()> {
        crate::archive::archive_directory(&self.dir, dest)
    }

    /// Builds the entry filename for a key and salt.
    fn encode_locator(key: &str, salt: &Salt) -> String {
        format!(
            "{}{LOCATOR_DELIMITER}{}",
            URL_SAFE_NO_PAD.encode(key.as_bytes()),
            salt.to_base64()
        )
    }

    /// Recovers the logical key and salt from an entry filename.
    fn split_locator(name: &str) -> CoreResult<(String, Salt)> {
        let (key_part, salt_part) = name.split_once(LOCATOR_DELIMITER).ok_or_else(|| {
            CoreError::corrupted(format!("unrecognized entry file name: {name}"))
        })?;

        let key_bytes = URL_SAFE_NO_PAD
            .decode(key_part)
            .map_err(|e| CoreError::corrupted(format!("entry file {name}: {e}")))?;
        let key = String::from_utf8(key_bytes)
            .map_err(|e| CoreError::corrupted(format!("entry file {name}: {e}")))?;
        let salt = Salt::from_base64(salt_part)
            .map_err(|e| CoreError::corrupted(format!("entry file {name}: {e}")))?;

        Ok((key, salt))
    }

    /// Returns each non-hidden file name in the entry directory.
    fn entry_names(&self) -> CoreResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry
                .file_name()
                .into_string()
                .map_err(|name| CoreError::corrupted(format!("non-UTF-8 file name: {name:?}")))?;
            // Skip in-progress write files; an empty key legitimately
            // encodes to a name starting with the delimiter, so only the
            // exact temp pattern is hidden.
            if name.starts_with('.') && name.ends_with(TMP_SUFFIX) {
                continue;
            }
            names.push(name);
        }
        Ok(names)
    }

    /// Finds the entry file for a key, if any.
    fn find_entry(&self, key: &str) -> CoreResult<Option<(PathBuf, Salt)>> {
        let prefix = format!(
            "{}{LOCATOR_DELIMITER}",
            URL_SAFE_NO_PAD.encode(key.as_bytes())
        );
        for name in self.entry_names()? {
            if let Some(salt_part) = name.strip_prefix(&prefix) {
                let salt = Salt::from_base64(salt_part)
                    .map_err(|e| CoreError::corrupted(format!("entry file {name}: {e}")))?;
                return Ok(Some((self.dir.join(&name), salt)));
            }
        }
        Ok(None)
    }

    /// Syncs the entry directory so renames and deletions are durable.
    #[cfg(unix)]
    fn sync_directory(&self) -> CoreResult<()> {
        let dir = File::open(&self.dir)?;
        dir.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> CoreResult<()> {
        // Windows NTFS journaling covers metadata durability; directory
        // fsync is not supported there.
        Ok(())
    }
}

impl EntryStore for DirBackend {
    fn put(&mut self, key: &str, salt: &Salt, ciphertext: &[u8]) -> CoreResult<()> {
        let previous = self.find_entry(key)?.map(|(path, _)| path);

        let encoded_key = URL_SAFE_NO_PAD.encode(key.as_bytes());
        let tmp_path = self.dir.join(format!(".{encoded_key}{TMP_SUFFIX}"));
        let final_path = self.dir.join(Self::encode_locator(key, salt));

        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(ciphertext)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &final_path)?;

        // The new entry is durably in place; only now drop the old one.
        if let Some(previous) = previous {
            if previous != final_path {
                fs::remove_file(&previous)?;
            }
        }
        self.sync_directory()?;

        debug!(key, path = %final_path.display(), "wrote entry");
        Ok(())
    }

    fn get(&self, key: &str) -> CoreResult<(Salt, Vec<u8>)> {
        match self.find_entry(key)? {
            Some((path, salt)) => {
                let ciphertext = fs::read(&path)?;
                Ok((salt, ciphertext))
            }
            None => Err(CoreError::key_not_found(key)),
        }
    }

    fn delete(&mut self, key: &str) -> CoreResult<()> {
        match self.find_entry(key)? {
            Some((path, _)) => {
                fs::remove_file(&path)?;
                self.sync_directory()?;
                debug!(key, "deleted entry");
                Ok(())
            }
            None => Err(CoreError::key_not_found(key)),
        }
    }

    fn contains(&self, key: &str) -> CoreResult<bool> {
        Ok(self.find_entry(key)?.is_some())
    }

    fn keys(&self) -> CoreResult<Vec<String>> {
        self.entry_names()?
            .iter()
            .map(|name| Self::split_locator(name).map(|(key, _)| key))
            .collect()
    }

    fn len(&self) -> CoreResult<usize> {
        // Counting goes through locator parsing so a foreign file in the
        // directory surfaces as corruption here exactly as it does in
        // keys(), never as a silently inflated count.
        Ok(self.keys()?.len())
    }
}
