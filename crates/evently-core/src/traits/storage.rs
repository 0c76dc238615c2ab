//! Persisted storage trait.

use crate::Result;

/// String key-value storage that survives restarts.
///
/// Only the session store writes the authentication keys.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Write several keys at once. Either every key is written or none is.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()>;

    /// Remove several keys at once. Either every key is removed or none is.
    fn remove_many(&self, keys: &[&str]) -> Result<()>;
}
