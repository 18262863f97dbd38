use std::collections::HashMap;

use super::KeyValueStore;
use crate::error::StoreError;

/// Volatile store backed by a `HashMap`.
///
/// Used by tests and by ephemeral runs. Cloning it is how tests simulate a
/// page reload: the clone starts from exactly what was persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_key_is_none() {
        let store = MemoryStore::new();
        assert!(store.get("tasks").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn set_overwrites() {
        let mut store = MemoryStore::new();
        store.set("points", "100").unwrap();
        store.set("points", "200").unwrap();
        assert_eq!(store.get("points").unwrap().as_deref(), Some("200"));
        assert_eq!(store.len(), 1);
    }
}
