//! Timestamped cache entry.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Current cache format version
pub const CACHE_VERSION: u32 = 1;

/// Snapshot lifetime: 24 hours.
pub const DEFAULT_TTL_SECONDS: u64 = 24 * 60 * 60;

/// TTLs are clamped to about a century.
const MAX_TTL_SECONDS: i64 = 100 * 365 * 24 * 60 * 60;

/// Cached value with its write time and lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
    pub ttl_seconds: u64,
    /// Entries with a different version are treated as misses.
    pub version: u32,
}

impl<T> CacheEntry<T> {
    /// Create a new cache entry stamped with the current time.
    pub fn new(data: T, ttl_seconds: u64) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
            ttl_seconds,
            version: CACHE_VERSION,
        }
    }

    /// Instant after which the entry is stale.
    pub fn expires_at(&self) -> DateTime<Utc> {
        let ttl = i64::try_from(self.ttl_seconds)
            .unwrap_or(MAX_TTL_SECONDS)
            .min(MAX_TTL_SECONDS);
        self.cached_at
            .checked_add_signed(Duration::seconds(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    /// Whether the entry was written by this cache format.
    pub fn is_current_version(&self) -> bool {
        self.version == CACHE_VERSION
    }

    pub fn age_seconds(&self) -> i64 {
        (Utc::now() - self.cached_at).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_entry_new() {
        let entry = CacheEntry::new("roster".to_string(), 3600);
        assert_eq!(entry.data, "roster");
        assert_eq!(entry.ttl_seconds, 3600);
        assert!(entry.is_current_version());
        assert!(entry.age_seconds() < 2);
    }

    #[test]
    fn test_fresh_entry_not_expired() {
        let entry = CacheEntry::new((), DEFAULT_TTL_SECONDS);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let mut entry = CacheEntry::new((), DEFAULT_TTL_SECONDS);
        entry.cached_at = Utc::now() - Duration::hours(25);
        assert!(entry.is_expired());

        let at_boundary = entry.cached_at + Duration::hours(24);
        assert!(entry.is_expired_at(at_boundary));
        assert!(!entry.is_expired_at(at_boundary - Duration::seconds(1)));
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let entry = CacheEntry::new((), u64::MAX);
        assert!(!entry.is_expired());
    }
}
