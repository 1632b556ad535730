//! Remote directory store boundary.
//!
//! The roster lives in a document collection keyed by employee ID. The
//! import only needs four calls: list, single upsert, single delete and a
//! bounded batch commit.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{DirectoryEntry, EmployeeRecord};

pub mod file;
pub mod memory;

pub use file::JsonFileDirectoryStore;
pub use memory::InMemoryDirectoryStore;

/// Per-commit operation ceiling of the remote store.
pub const MAX_BATCH_OPERATIONS: usize = 400;

/// Document store holding the employee directory.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Short name of the backend, for logs.
    fn store_type(&self) -> &'static str;

    /// Every entry of `collection`.
    async fn list_all(&self, collection: &str) -> StoreResult<Vec<DirectoryEntry>>;

    /// Create or fully overwrite the entry `id`.
    async fn upsert(&self, collection: &str, id: &str, record: &EmployeeRecord) -> StoreResult<()>;

    /// Remove the entry `id`.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Upsert `records` (keyed by employee ID) as one commit.
    ///
    /// Batches above [`MAX_BATCH_OPERATIONS`] are rejected. The default
    /// implementation writes record by record and is only atomic per record;
    /// stores with a real batch primitive override it.
    async fn commit_batch(&self, collection: &str, records: &[EmployeeRecord]) -> StoreResult<()> {
        check_batch_size(records.len())?;
        for record in records {
            self.upsert(collection, &record.employee_id, record).await?;
        }
        Ok(())
    }
}

/// Reject batches above the per-commit ceiling.
pub fn check_batch_size(size: usize) -> StoreResult<()> {
    if size > MAX_BATCH_OPERATIONS {
        return Err(crate::error::StoreError::BatchTooLarge {
            size,
            limit: MAX_BATCH_OPERATIONS,
        });
    }
    Ok(())
}
