//! Import service.
//!
//! Runs one roster import end to end: hash and parse the payload, normalize
//! rows, diff against a fresh directory read, apply the plan and refresh the
//! cache. Also serves cache-first directory reads for the roster screen.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::cache::DirectoryCache;
use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::models::{DirectorySnapshot, EmployeeRecord, Gender, ImportSummary, Role, Status};
use crate::services::bulk_writer::BulkWriter;
use crate::services::{normalizer, reconciler, sheet_parser};
use crate::store::DirectoryStore;

/// Roster import orchestration for one directory collection.
pub struct ImportService {
    store: Arc<dyn DirectoryStore>,
    cache: DirectoryCache,
    config: ImportConfig,
    in_progress: AtomicBool,
}

/// Result of [`ImportService::load_directory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRead {
    pub snapshot: DirectorySnapshot,
    /// Served from the local cache without touching the store.
    pub from_cache: bool,
    /// The store was read but the snapshot could not be cached.
    pub cache_degraded: bool,
}

/// Releases the in-progress flag when dropped.
struct ImportGuard<'a>(&'a AtomicBool);

impl<'a> ImportGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ImportError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ImportError::ConcurrentImport)?;
        Ok(Self(flag))
    }
}

impl Drop for ImportGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ImportService {
    pub fn new(
        store: Arc<dyn DirectoryStore>,
        cache: DirectoryCache,
        config: ImportConfig,
    ) -> Self {
        Self {
            store,
            cache,
            config,
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn cache(&self) -> &DirectoryCache {
        &self.cache
    }

    /// Whether an import is currently running.
    pub fn is_importing(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Import a roster workbook and reconcile the directory against it.
    ///
    /// Payload errors abort before any write. Write failures are counted in
    /// the summary instead.
    pub async fn import_workbook(&self, file_data: &[u8]) -> Result<ImportSummary, ImportError> {
        let _guard = ImportGuard::acquire(&self.in_progress)?;

        let file_hash = {
            let mut hasher = Sha256::new();
            hasher.update(file_data);
            hex::encode(hasher.finalize())
        };

        let rows = sheet_parser::read_rows(file_data, &self.config.sheet_config())?;
        let rows_read = rows.len();

        let batch = normalizer::normalize_rows(rows, &self.config.sheet_config().columns);

        tracing::info!(
            file_hash = %file_hash,
            file_size_bytes = file_data.len(),
            rows_read,
            valid_rows = batch.records.len(),
            skipped = batch.skipped,
            duplicates = batch.duplicates,
            "Starting roster import"
        );

        let snapshot = self.read_remote().await?;
        let plan = reconciler::plan(&batch.records, &snapshot, &self.config.protected_id);

        let writer = BulkWriter::new(
            Arc::clone(&self.store),
            &self.config.collection,
            self.config.batch_size,
        );
        let written = writer.apply(&plan, &self.cache).await;

        let summary = ImportSummary {
            file_hash,
            rows_read,
            rows_skipped: batch.skipped,
            added: written.added,
            updated: written.updated,
            removed: written.deleted,
            errors: written.errors,
            snapshot_refreshed: written.snapshot_refreshed,
            cache_degraded: written.cache_degraded,
        };

        tracing::info!(
            added = summary.added,
            updated = summary.updated,
            removed = summary.removed,
            errors = summary.errors,
            "Roster import completed"
        );

        Ok(summary)
    }

    /// Current directory, served from the cache when it is fresh.
    ///
    /// A remote read repopulates the cache; `cache_degraded` reports when
    /// that write failed.
    pub async fn load_directory(&self) -> Result<DirectoryRead, ImportError> {
        if let Some(snapshot) = self.cache.read() {
            return Ok(DirectoryRead {
                snapshot,
                from_cache: true,
                cache_degraded: false,
            });
        }
        let snapshot = self.read_remote().await?;
        let cache_degraded = self.cache.write(&snapshot).is_degraded();
        Ok(DirectoryRead {
            snapshot,
            from_cache: false,
            cache_degraded,
        })
    }

    /// Create the protected administrative entry if it is missing.
    ///
    /// Returns whether an entry was written.
    pub async fn seed_admin(&self) -> Result<bool, ImportError> {
        let snapshot = self.read_remote().await?;
        if snapshot.get(&self.config.protected_id).is_some() {
            return Ok(false);
        }

        let record = admin_record(&self.config.protected_id);
        let id = &self.config.protected_id;
        if let Err(e) = self.store.upsert(&self.config.collection, id, &record).await {
            tracing::error!(id = %id, error = %e, "Failed to seed administrative entry");
            return Err(e.into());
        }
        self.cache.clear();

        tracing::info!(id = %self.config.protected_id, "Seeded administrative entry");
        Ok(true)
    }

    /// Fresh read of the whole collection from the store.
    async fn read_remote(&self) -> Result<DirectorySnapshot, ImportError> {
        match self.store.list_all(&self.config.collection).await {
            Ok(entries) => Ok(DirectorySnapshot::new(entries)),
            Err(e) => {
                tracing::error!(
                    store = self.store.store_type(),
                    collection = %self.config.collection,
                    error = %e,
                    "Failed to read directory"
                );
                Err(e.into())
            }
        }
    }
}

fn admin_record(id: &str) -> EmployeeRecord {
    EmployeeRecord {
        employee_id: id.to_uppercase(),
        first_name: "CLINIC".to_string(),
        last_name: "ADMINISTRATOR".to_string(),
        middle_initial: String::new(),
        date_of_birth: None,
        gender: Gender::Unspecified,
        designation: "ADMINISTRATOR".to_string(),
        department: "Administration".to_string(),
        role: Role::Admin,
        status: Status::Active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemorySlot;
    use crate::store::InMemoryDirectoryStore;

    fn service(store: Arc<InMemoryDirectoryStore>) -> ImportService {
        ImportService::new(
            store,
            DirectoryCache::new(Arc::new(MemorySlot::new())),
            ImportConfig::default(),
        )
    }

    #[test]
    fn test_guard_rejects_second_holder_and_releases() {
        let flag = AtomicBool::new(false);
        let first = ImportGuard::acquire(&flag).unwrap();
        assert!(matches!(
            ImportGuard::acquire(&flag),
            Err(ImportError::ConcurrentImport)
        ));
        drop(first);
        assert!(ImportGuard::acquire(&flag).is_ok());
        assert!(!flag.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn test_parse_failure_releases_flag() {
        let store = Arc::new(InMemoryDirectoryStore::new());
        let service = service(store);
        let err = service.import_workbook(b"nope").await.unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));
        assert!(!service.is_importing());
    }

    #[tokio::test]
    async fn test_seed_admin_once() {
        let store = Arc::new(InMemoryDirectoryStore::new());
        let service = service(store.clone());
        assert!(service.seed_admin().await.unwrap());
        assert!(!service.seed_admin().await.unwrap());

        let entries = store.list_all("users").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "admin");
        assert_eq!(entries[0].record.role, Role::Admin);
        assert_eq!(entries[0].record.gender, Gender::Unspecified);
    }

    #[tokio::test]
    async fn test_load_directory_prefers_cache() {
        let store = Arc::new(InMemoryDirectoryStore::new());
        let service = service(store.clone());
        service.seed_admin().await.unwrap();

        let first = service.load_directory().await.unwrap();
        assert_eq!(first.snapshot.len(), 1);
        assert!(!first.from_cache);
        assert!(!first.cache_degraded);

        // A write behind the cache's back is not visible until it expires.
        store
            .upsert("users", "E-9", &admin_record("E-9"))
            .await
            .unwrap();
        let cached = service.load_directory().await.unwrap();
        assert!(cached.from_cache);
        assert_eq!(cached.snapshot.len(), 1);

        service.cache().clear();
        assert_eq!(service.load_directory().await.unwrap().snapshot.len(), 2);
    }

    #[tokio::test]
    async fn test_load_directory_reports_degraded_cache() {
        let store = Arc::new(InMemoryDirectoryStore::new());
        let service = ImportService::new(
            store.clone(),
            DirectoryCache::new(Arc::new(MemorySlot::with_capacity(8))),
            ImportConfig::default(),
        );
        service.seed_admin().await.unwrap();

        let read = service.load_directory().await.unwrap();
        assert_eq!(read.snapshot.len(), 1);
        assert!(!read.from_cache);
        assert!(read.cache_degraded);
        assert!(service.cache().read().is_none());

        // Still nothing cached, so the next read goes back to the store.
        let again = service.load_directory().await.unwrap();
        assert!(!again.from_cache);
        assert!(again.cache_degraded);
    }
}
