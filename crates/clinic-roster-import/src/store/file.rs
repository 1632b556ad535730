//! JSON-file directory store.
//!
//! Each collection is one `<collection>.json` file holding an id-to-record
//! map. Writes go through a temporary file and a rename, so a batch commit
//! either lands completely or not at all.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use super::{check_batch_size, DirectoryStore};
use crate::error::{StoreError, StoreResult};
use crate::models::{DirectoryEntry, EmployeeRecord};

type Collection = BTreeMap<String, EmployeeRecord>;

/// Directory store persisted as JSON files under a data directory.
#[derive(Debug)]
pub struct JsonFileDirectoryStore {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileDirectoryStore {
    /// Create a store rooted at `data_dir`. The directory is created lazily.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Directory holding the collection files.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.data_dir.join(format!("{collection}.json"))
    }

    async fn load(&self, collection: &str) -> StoreResult<Collection> {
        let path = self.collection_path(collection);
        match fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Collection::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, collection: &str, records: &Collection) -> StoreResult<()> {
        fs::create_dir_all(&self.data_dir).await?;
        let path = self.collection_path(collection);
        let tmp = path.with_extension("json.tmp");
        let contents = serde_json::to_vec_pretty(records)?;
        fs::write(&tmp, contents).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl DirectoryStore for JsonFileDirectoryStore {
    fn store_type(&self) -> &'static str {
        "json_file"
    }

    async fn list_all(&self, collection: &str) -> StoreResult<Vec<DirectoryEntry>> {
        let records = self.load(collection).await?;
        Ok(records
            .into_iter()
            .map(|(id, record)| DirectoryEntry { id, record })
            .collect())
    }

    async fn upsert(&self, collection: &str, id: &str, record: &EmployeeRecord) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load(collection).await?;
        records.insert(id.to_string(), record.clone());
        self.save(collection, &records).await
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load(collection).await?;
        if records.remove(id).is_none() {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        self.save(collection, &records).await
    }

    async fn commit_batch(&self, collection: &str, records: &[EmployeeRecord]) -> StoreResult<()> {
        check_batch_size(records.len())?;
        let _guard = self.write_lock.lock().await;
        let mut current = self.load(collection).await?;
        for record in records {
            current.insert(record.employee_id.clone(), record.clone());
        }
        self.save(collection, &current).await
    }
}
