//! Local directory cache.
//!
//! A single slot of a local key-value store holds the last authoritative
//! directory snapshot with its write time and TTL. The roster screen reads
//! it before going to the remote store.

pub mod directory;
pub mod entry;
pub mod slot;

pub use directory::{CacheStatus, CacheWriteOutcome, DirectoryCache, DIRECTORY_CACHE_KEY};
pub use entry::{CacheEntry, CACHE_VERSION, DEFAULT_TTL_SECONDS};
pub use slot::{FileSlot, KeyValueSlot, MemorySlot};
