//! In-memory key-value storage.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::Result;
use crate::traits::KeyValueStore;

/// A [`KeyValueStore`] that lives only as long as the process.
///
/// Sharing one `MemoryStore` between two session stores simulates a reload.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut map = self.entries.write().unwrap();
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.entries.write().unwrap();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("authTokens", "{}").unwrap();
        assert_eq!(store.get("authTokens").unwrap().as_deref(), Some("{}"));

        store.remove("authTokens").unwrap();
        store.remove("authTokens").unwrap();
        assert!(store.get("authTokens").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn set_many_and_remove_many() {
        let store = MemoryStore::new();
        store
            .set_many(&[("access_token", "a"), ("refresh_token", "r")])
            .unwrap();
        assert_eq!(store.get("refresh_token").unwrap().as_deref(), Some("r"));

        store.remove_many(&["access_token", "refresh_token", "missing"]).unwrap();
        assert!(store.is_empty());
    }
}
