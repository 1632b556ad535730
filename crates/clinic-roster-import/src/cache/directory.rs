//! Single-slot directory snapshot cache.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entry::{CacheEntry, DEFAULT_TTL_SECONDS};
use super::slot::KeyValueSlot;
use crate::models::DirectorySnapshot;

/// Slot key holding the serialized snapshot entry.
pub const DIRECTORY_CACHE_KEY: &str = "clinic_directory";

/// Result of [`DirectoryCache::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheWriteOutcome {
    Stored,
    /// The first write failed; the slot was cleared and the retry succeeded.
    StoredAfterRetry,
    /// Both attempts failed. Nothing is cached.
    Degraded,
}

impl CacheWriteOutcome {
    pub fn is_degraded(self) -> bool {
        self == Self::Degraded
    }
}

/// Metadata about the cached snapshot, for status displays.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub entries: usize,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub expired: bool,
}

/// Snapshot cache over one slot of a [`KeyValueSlot`].
#[derive(Clone)]
pub struct DirectoryCache {
    slot: Arc<dyn KeyValueSlot>,
    ttl_seconds: u64,
}

impl std::fmt::Debug for DirectoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryCache")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl DirectoryCache {
    pub fn new(slot: Arc<dyn KeyValueSlot>) -> Self {
        Self::with_ttl(slot, DEFAULT_TTL_SECONDS)
    }

    pub fn with_ttl(slot: Arc<dyn KeyValueSlot>, ttl_seconds: u64) -> Self {
        Self { slot, ttl_seconds }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Cached snapshot, if present, readable, unexpired and non-empty.
    ///
    /// Unparseable entries are removed from the slot.
    pub fn read(&self) -> Option<DirectorySnapshot> {
        let entry = self.load_entry()?;
        if entry.is_expired() {
            tracing::debug!(cached_at = %entry.cached_at, "Directory cache expired");
            return None;
        }
        if entry.data.is_empty() {
            tracing::debug!("Directory cache holds an empty snapshot");
            return None;
        }
        tracing::debug!(entries = entry.data.len(), "Directory cache hit");
        Some(entry.data)
    }

    /// Store `snapshot` with a fresh expiry.
    ///
    /// On failure the slot is cleared and the write retried once.
    pub fn write(&self, snapshot: &DirectorySnapshot) -> CacheWriteOutcome {
        let entry = CacheEntry::new(snapshot, self.ttl_seconds);
        let payload = match serde_json::to_string(&entry) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Failed to serialize directory snapshot, caching disabled"
                );
                return CacheWriteOutcome::Degraded;
            }
        };

        let first = match self.slot.set(DIRECTORY_CACHE_KEY, &payload) {
            Ok(()) => return CacheWriteOutcome::Stored,
            Err(e) => e,
        };
        tracing::warn!(error = %first, "Directory cache write failed, clearing slot and retrying");
        self.clear();

        match self.slot.set(DIRECTORY_CACHE_KEY, &payload) {
            Ok(()) => CacheWriteOutcome::StoredAfterRetry,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    entries = snapshot.len(),
                    "Directory cache write failed twice, running without cache"
                );
                CacheWriteOutcome::Degraded
            }
        }
    }

    /// Remove the cached snapshot.
    pub fn clear(&self) {
        if let Err(e) = self.slot.remove(DIRECTORY_CACHE_KEY) {
            tracing::warn!(error = %e, "Failed to clear directory cache");
        }
    }

    /// Metadata of the stored entry, including expired ones.
    pub fn status(&self) -> Option<CacheStatus> {
        let entry = self.load_entry()?;
        Some(CacheStatus {
            entries: entry.data.len(),
            cached_at: entry.cached_at,
            expires_at: entry.expires_at(),
            expired: entry.is_expired(),
        })
    }

    fn load_entry(&self) -> Option<CacheEntry<DirectorySnapshot>> {
        let raw = match self.slot.get(DIRECTORY_CACHE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("Directory cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read directory cache");
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry<DirectorySnapshot>>(&raw) {
            Ok(entry) if entry.is_current_version() => Some(entry),
            Ok(entry) => {
                tracing::debug!(
                    version = entry.version,
                    "Discarding directory cache of old format"
                );
                self.clear();
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Directory cache is corrupted, clearing");
                self.clear();
                None
            }
        }
    }
}
