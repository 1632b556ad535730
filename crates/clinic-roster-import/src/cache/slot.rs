//! Local key-value slots.
//!
//! Slots hold opaque strings. They are synchronous: the cache is touched only
//! inline with the operation that reads or refreshes it.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::CacheError;

/// Default byte capacity of a [`FileSlot`] directory (5MB).
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// Local string store with a storage quota.
pub trait KeyValueSlot: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// In-process slot, optionally bounded in bytes.
#[derive(Debug, Default)]
pub struct MemorySlot {
    values: Mutex<HashMap<String, String>>,
    capacity: Option<usize>,
}

impl MemorySlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot that refuses writes once its values exceed `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            capacity: Some(capacity),
        }
    }

    /// Total bytes currently stored.
    pub fn used_bytes(&self) -> usize {
        self.lock().values().map(String::len).sum()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueSlot for MemorySlot {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut values = self.lock();
        if let Some(capacity) = self.capacity {
            let others: usize = values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let available = capacity.saturating_sub(others);
            if value.len() > available {
                return Err(CacheError::CapacityExceeded {
                    needed: value.len(),
                    capacity: available,
                });
            }
        }
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.lock().remove(key);
        Ok(())
    }
}

/// Slot persisted as one `<key>.json` file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
    max_size_bytes: u64,
}

impl FileSlot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_max_size(dir, DEFAULT_MAX_SIZE_BYTES)
    }

    pub fn with_max_size(dir: impl Into<PathBuf>, max_size_bytes: u64) -> Self {
        Self {
            dir: dir.into(),
            max_size_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Bytes used by every slot file except `key`'s.
    fn used_by_others(&self, key: &str) -> Result<u64, CacheError> {
        let own = self.path_for(key);
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut total = 0u64;
        for entry in entries {
            let path = entry?.path();
            if path != own && path.extension().is_some_and(|ext| ext == "json") {
                total += fs::metadata(&path)?.len();
            }
        }
        Ok(total)
    }
}

impl KeyValueSlot for FileSlot {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let available = self.max_size_bytes.saturating_sub(self.used_by_others(key)?);
        if value.len() as u64 > available {
            return Err(CacheError::CapacityExceeded {
                needed: value.len(),
                capacity: usize::try_from(available).unwrap_or(usize::MAX),
            });
        }
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
