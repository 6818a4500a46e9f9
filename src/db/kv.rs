//! Flat key-value namespace that stands in for browser local storage.
//!
//! Every collection is kept as one JSON document under its own key, so a
//! backend only needs string get/set/remove.

use std::collections::HashMap;
use std::sync::Mutex;

use super::DatabaseError;

/// Key-value storage backing the local collections.
///
/// A single `set` replaces the whole value for that key. No operation spans
/// more than one key.
pub trait KeyValueStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError>;

    /// Set a key-value pair, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), DatabaseError>;
}

/// Process-local store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let entries = self.entries.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        let mut entries = self.entries.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DatabaseError> {
        let mut entries = self.entries.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_key_is_none() {
        let store = MemoryStore::new();
        assert!(store.get("moods").unwrap().is_none());
    }

    #[test]
    fn set_then_get() {
        let store = MemoryStore::new();
        store.set("moods", "[]").unwrap();
        assert_eq!(store.get("moods").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn set_overwrites() {
        let store = MemoryStore::new();
        store.set("meals", "[1]").unwrap();
        store.set("meals", "[2]").unwrap();
        assert_eq!(store.get("meals").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let store = MemoryStore::new();
        store.remove("current_user").unwrap();
        store.set("current_user", "[]").unwrap();
        store.remove("current_user").unwrap();
        assert!(store.get("current_user").unwrap().is_none());
    }
}
