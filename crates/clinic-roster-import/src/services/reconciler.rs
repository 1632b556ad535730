//! Directory reconciliation.
//!
//! Diffs a normalized batch against the current directory snapshot. The plan
//! is a pure function of (batch, snapshot, protected id): every batch record
//! is upserted, and every directory entry missing from the batch is deleted,
//! except the protected administrative entry.

use std::collections::HashSet;

use crate::models::{DirectorySnapshot, EmployeeRecord, ReconciliationPlan};

/// Compute the writes that make the directory match `batch`.
#[must_use]
pub fn plan(
    batch: &[EmployeeRecord],
    snapshot: &DirectorySnapshot,
    protected_id: &str,
) -> ReconciliationPlan {
    let mut imported_ids: HashSet<String> = batch.iter().map(EmployeeRecord::key).collect();
    imported_ids.insert(protected_id.to_uppercase());

    let to_delete: Vec<String> = snapshot
        .entries
        .iter()
        .filter(|entry| !imported_ids.contains(&entry.id.to_uppercase()))
        .map(|entry| entry.id.clone())
        .collect();

    let existing = snapshot.ids();
    let existing_keys: HashSet<String> = batch
        .iter()
        .map(EmployeeRecord::key)
        .filter(|key| existing.contains(key))
        .collect();

    tracing::debug!(
        upserts = batch.len(),
        updates = existing_keys.len(),
        deletes = to_delete.len(),
        directory_size = snapshot.len(),
        "Computed reconciliation plan"
    );

    ReconciliationPlan {
        to_upsert: batch.to_vec(),
        to_delete,
        existing_keys,
    }
}
