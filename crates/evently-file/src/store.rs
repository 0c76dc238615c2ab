//! Filesystem key-value storage.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, instrument, warn};

use evently_core::Result;
use evently_core::error::{Error, StorageError};
use evently_core::traits::KeyValueStore;

fn map_io(err: std::io::Error) -> Error {
    Error::Storage(StorageError::Io {
        message: err.to_string(),
    })
}

/// A [`KeyValueStore`] backed by a single JSON object file.
///
/// Every operation takes an exclusive lock on a sibling `.lock` file, so
/// several processes sharing the same data directory never interleave
/// writes. Writes go to a temp file and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store persisted at `path`. Nothing is touched until first use.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a store at `<dir>/session.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join("session.json"))
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn lock(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(map_io)?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(map_io)?;

        lock_file.lock_exclusive().map_err(map_io)?;
        Ok(lock_file)
    }

    /// Read the whole map. A file that is not a JSON object of strings
    /// is discarded so that one bad write cannot wedge every key.
    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path).map_err(map_io)?;
        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding unreadable storage file");
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(entries).map_err(|e| {
            Error::Storage(StorageError::Io {
                message: e.to_string(),
            })
        })?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &content).map_err(map_io)?;

        // Tokens live here; keep the file private (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&temp_path).map_err(map_io)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&temp_path, perms).map_err(map_io)?;
        }

        fs::rename(&temp_path, &self.path).map_err(map_io)?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let lock_file = self.lock()?;
        let mut entries = self.read_entries()?;

        if f(&mut entries) {
            self.write_entries(&entries)?;
        }

        lock_file.unlock().map_err(map_io)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let lock_file = self.lock()?;
        let value = self.read_entries()?.remove(key);
        lock_file.unlock().map_err(map_io)?;
        Ok(value)
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })?;
        debug!("Stored key");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| entries.remove(key).is_some())
    }

    #[instrument(skip_all, fields(path = %self.path.display(), keys = entries.len()))]
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.update(|map| {
            for (key, value) in entries {
                map.insert(key.to_string(), value.to_string());
            }
            !entries.is_empty()
        })?;
        debug!("Stored keys");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.update(|map| {
            let mut changed = false;
            for key in keys {
                changed |= map.remove(*key).is_some();
            }
            changed
        })
    }
}
