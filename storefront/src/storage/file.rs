//! File-backed storage implementation.

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use super::traits::SessionStorage;
use crate::error::{Error, Result};

/// Storage persisted as a JSON object in a single file.
///
/// Every mutation rewrites the whole file through a sibling temp file and a
/// rename, so other readers of the path never see half of a batch.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

type Entries = BTreeMap<String, String>;

impl FileStorage {
    /// Open storage at the given path. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Entries> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Entries::new()),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                Error::storage(format!("corrupt storage file {}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Load for a mutation. A corrupt file is discarded rather than blocking writes.
    fn load_for_write(&self) -> Result<Entries> {
        match self.load() {
            Err(Error::Storage(msg)) => {
                log::warn!("{msg}; replacing");
                Ok(Entries::new())
            }
            other => other,
        }
    }

    fn store(&self, entries: &Entries) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn with_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::storage("file storage lock poisoned"))?;
        f()
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_lock(|| Ok(self.load()?.remove(key)))
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.with_lock(|| {
            let mut data = self.load_for_write()?;
            for (key, value) in entries {
                data.insert((*key).to_owned(), (*value).to_owned());
            }
            self.store(&data)
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.with_lock(|| {
            if !self.path.exists() {
                return Ok(());
            }
            let mut data = self.load_for_write()?;
            for key in keys {
                data.remove(*key);
            }
            self.store(&data)
        })
    }
}
