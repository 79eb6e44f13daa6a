//! Session storage trait definitions.

use crate::error::{Error, Result};

/// Trait for string-valued key-value storage backends.
///
/// Batch operations must be applied as a single write: a reader either sees
/// every entry of a batch or none of them.
pub trait SessionStorage: Send + Sync + std::fmt::Debug {
    /// Get a value by key.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write several entries in one operation.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()>;

    /// Remove several keys in one operation.
    fn remove_many(&self, keys: &[&str]) -> Result<()>;

    /// Set a single value.
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_many(&[(key, value)])
    }

    /// Remove a single value.
    fn remove(&self, key: &str) -> Result<()> {
        self.remove_many(&[key])
    }
}

/// Extension trait for session storage with typed operations.
pub trait SessionStorageExt: SessionStorage {
    /// Get a JSON-deserialized value. Unparseable data reads as `None`.
    fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        Ok(self
            .get(key)?
            .and_then(|raw| serde_json::from_str(&raw).ok()))
    }

    /// Set a JSON-serialized value.
    fn set_json<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let data = serde_json::to_string(value).map_err(Error::Json)?;
        self.set(key, &data)
    }
}

// Blanket implementation
impl<T: SessionStorage + ?Sized> SessionStorageExt for T {}
