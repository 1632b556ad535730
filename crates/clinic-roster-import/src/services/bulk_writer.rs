//! Bulk writer for reconciliation plans.
//!
//! Deletes go first, one call per id. Upserts follow in sequential batch
//! commits bounded by the store's per-commit ceiling. Failures are counted
//! and never stop the run; committed batches are not rolled back. The run
//! ends by re-reading the directory and refreshing the local cache.

use std::sync::Arc;

use crate::cache::DirectoryCache;
use crate::models::{DirectorySnapshot, EmployeeRecord, ReconciliationPlan, WriteSummary};
use crate::store::{DirectoryStore, MAX_BATCH_OPERATIONS};

/// Outcome of one batch commit.
enum ChunkOutcome {
    Committed { added: usize, updated: usize },
    Failed,
}

/// Applies reconciliation plans to a directory collection.
#[derive(Clone)]
pub struct BulkWriter {
    store: Arc<dyn DirectoryStore>,
    collection: String,
    batch_size: usize,
}

impl BulkWriter {
    /// Create a writer committing at most `batch_size` upserts at a time.
    ///
    /// `batch_size` is clamped to `1..=MAX_BATCH_OPERATIONS`.
    pub fn new(store: Arc<dyn DirectoryStore>, collection: &str, batch_size: usize) -> Self {
        Self {
            store,
            collection: collection.to_string(),
            batch_size: batch_size.clamp(1, MAX_BATCH_OPERATIONS),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Apply `plan`, then refresh `cache` from a fresh directory read.
    pub async fn apply(&self, plan: &ReconciliationPlan, cache: &DirectoryCache) -> WriteSummary {
        tracing::info!(
            store = self.store.store_type(),
            collection = %self.collection,
            deletes = plan.to_delete.len(),
            upserts = plan.to_upsert.len(),
            batch_size = self.batch_size,
            "Applying reconciliation plan"
        );

        let mut summary = WriteSummary::default();

        for id in &plan.to_delete {
            match self.store.delete(&self.collection, id).await {
                Ok(()) => summary.deleted += 1,
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "Failed to delete directory entry");
                    summary.errors += 1;
                }
            }
        }

        for (index, chunk) in plan.to_upsert.chunks(self.batch_size).enumerate() {
            match self.commit_chunk(plan, chunk).await {
                ChunkOutcome::Committed { added, updated } => {
                    summary.added += added;
                    summary.updated += updated;
                }
                ChunkOutcome::Failed => {
                    tracing::warn!(batch = index, records = chunk.len(), "Batch commit failed");
                    summary.errors += chunk.len();
                }
            }
        }

        self.refresh_snapshot(cache, &mut summary).await;

        tracing::info!(
            added = summary.added,
            updated = summary.updated,
            deleted = summary.deleted,
            errors = summary.errors,
            snapshot_refreshed = summary.snapshot_refreshed,
            cache_degraded = summary.cache_degraded,
            "Reconciliation plan applied"
        );
        summary
    }

    async fn commit_chunk(
        &self,
        plan: &ReconciliationPlan,
        chunk: &[EmployeeRecord],
    ) -> ChunkOutcome {
        match self.store.commit_batch(&self.collection, chunk).await {
            Ok(()) => {
                let updated = chunk.iter().filter(|r| plan.is_update(r)).count();
                tracing::debug!(records = chunk.len(), "Batch committed");
                ChunkOutcome::Committed {
                    added: chunk.len() - updated,
                    updated,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Batch commit rejected by store");
                ChunkOutcome::Failed
            }
        }
    }

    async fn refresh_snapshot(&self, cache: &DirectoryCache, summary: &mut WriteSummary) {
        match self.store.list_all(&self.collection).await {
            Ok(entries) => {
                summary.snapshot_refreshed = true;
                let snapshot = DirectorySnapshot::new(entries);
                summary.cache_degraded = cache.write(&snapshot).is_degraded();
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Failed to re-read directory after import, clearing cache"
                );
                cache.clear();
            }
        }
    }
}
