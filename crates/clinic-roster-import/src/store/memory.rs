//! In-memory directory store.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{check_batch_size, DirectoryStore};
use crate::error::{StoreError, StoreResult};
use crate::models::{DirectoryEntry, EmployeeRecord};

type Collection = BTreeMap<String, EmployeeRecord>;

/// Directory store kept in process memory.
///
/// Batch commits are atomic: a rejected batch leaves the collection untouched.
#[derive(Debug, Default)]
pub struct InMemoryDirectoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    commits: AtomicUsize,
}

impl InMemoryDirectoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries` in `collection`.
    #[must_use]
    pub fn with_entries(collection: &str, entries: Vec<DirectoryEntry>) -> Self {
        let records: Collection = entries.into_iter().map(|e| (e.id, e.record)).collect();
        Self {
            collections: RwLock::new(HashMap::from([(collection.to_string(), records)])),
            commits: AtomicUsize::new(0),
        }
    }

    /// Number of successful batch commits so far.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectoryStore {
    fn store_type(&self) -> &'static str {
        "memory"
    }

    async fn list_all(&self, collection: &str) -> StoreResult<Vec<DirectoryEntry>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .map(|(id, record)| DirectoryEntry {
                        id: id.clone(),
                        record: record.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn upsert(&self, collection: &str, id: &str, record: &EmployeeRecord) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), record.clone());
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        collections
            .get_mut(collection)
            .and_then(|records| records.remove(id))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }

    async fn commit_batch(&self, collection: &str, records: &[EmployeeRecord]) -> StoreResult<()> {
        check_batch_size(records.len())?;
        let mut collections = self.collections.write().await;
        let target = collections.entry(collection.to_string()).or_default();
        for record in records {
            target.insert(record.employee_id.clone(), record.clone());
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
