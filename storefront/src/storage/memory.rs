//! In-memory storage implementation.

use std::{collections::HashMap, sync::RwLock};

use super::traits::SessionStorage;
use crate::error::{Error, Result};

/// In-process storage, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with entries.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let data = entries
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Self {
            data: RwLock::new(data),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.len()).unwrap_or(0)
    }

    /// Whether the storage holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::storage("memory storage lock poisoned")
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data.get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut data = self.data.write().map_err(poisoned)?;
        for (key, value) in entries {
            data.insert((*key).to_owned(), (*value).to_owned());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut data = self.data.write().map_err(poisoned)?;
        for key in keys {
            data.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let storage = MemoryStorage::new();

        storage.set("key1", "value1").unwrap();
        assert_eq!(storage.get("key1").unwrap().as_deref(), Some("value1"));

        storage.remove("key1").unwrap();
        assert_eq!(storage.get("key1").unwrap(), None);
    }

    #[test]
    fn test_batches() {
        let storage = MemoryStorage::new();

        storage.set_many(&[("a", "1"), ("b", "2"), ("c", "3")]).unwrap();
        assert_eq!(storage.len(), 3);

        storage.remove_many(&["a", "b", "missing"]).unwrap();
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get("c").unwrap().as_deref(), Some("3"));
    }
}
