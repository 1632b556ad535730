//! Integration test helpers for clinic-roster-import.
//!
//! Provides roster workbook fixtures and a directory store that can be told
//! to fail specific calls.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use clinic_roster_import::error::{StoreError, StoreResult};
use clinic_roster_import::models::{DirectoryEntry, EmployeeRecord, Gender, Role, Status};
use clinic_roster_import::store::{check_batch_size, DirectoryStore, InMemoryDirectoryStore};
use clinic_roster_import::{DirectoryCache, ImportConfig, ImportService, MemorySlot};
use rust_xlsxwriter::Workbook;
use tokio::sync::Semaphore;

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

pub const COLLECTION: &str = "users";
pub const ADMIN_ID: &str = "admin";

/// Birth date cell of a fixture row.
#[derive(Debug, Clone)]
pub enum Dob {
    Blank,
    Serial(f64),
    Text(String),
}

/// One data row of the HR roster template.
#[derive(Debug, Clone)]
pub struct RosterRow {
    pub id: String,
    pub name: String,
    pub dob: Dob,
    pub gender: String,
    pub designation: String,
    pub department: String,
}

impl RosterRow {
    pub fn new(id: &str, name: &str, gender: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            dob: Dob::Blank,
            gender: gender.to_string(),
            designation: "staff nurse".to_string(),
            department: "internal medicine".to_string(),
        }
    }

    pub fn with_dob(mut self, dob: Dob) -> Self {
        self.dob = dob;
        self
    }

    pub fn with_designation(mut self, designation: &str) -> Self {
        self.designation = designation.to_string();
        self
    }
}

/// `count` valid rows with ids `EMP-0000`, `EMP-0001`, ...
pub fn numbered_rows(count: usize) -> Vec<RosterRow> {
    (0..count)
        .map(|i| RosterRow::new(&format!("EMP-{i:04}"), "Garcia, Ana B.", "F"))
        .collect()
}

/// Build an XLSX roster: a heading row, then `rows` in columns B, C, D, E, M, N.
pub fn roster_workbook(rows: &[RosterRow]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    let headings = [
        (0u16, "No."),
        (1, "Employee No."),
        (2, "Name"),
        (3, "Birth Date"),
        (4, "Sex"),
        (12, "Designation"),
        (13, "Department"),
    ];
    for (col, heading) in headings {
        sheet.write_string(0, col, heading).unwrap();
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_number(r, 0, (i + 1) as f64).unwrap();
        if !row.id.is_empty() {
            sheet.write_string(r, 1, &row.id).unwrap();
        }
        if !row.name.is_empty() {
            sheet.write_string(r, 2, &row.name).unwrap();
        }
        match &row.dob {
            Dob::Blank => {}
            Dob::Serial(serial) => {
                sheet.write_number(r, 3, *serial).unwrap();
            }
            Dob::Text(text) => {
                sheet.write_string(r, 3, text).unwrap();
            }
        }
        if !row.gender.is_empty() {
            sheet.write_string(r, 4, &row.gender).unwrap();
        }
        sheet.write_string(r, 12, &row.designation).unwrap();
        sheet.write_string(r, 13, &row.department).unwrap();
    }

    workbook.save_to_buffer().unwrap()
}

/// Directory entry for a record already in the directory.
pub fn existing_entry(id: &str) -> DirectoryEntry {
    DirectoryEntry {
        id: id.to_string(),
        record: EmployeeRecord {
            employee_id: id.to_uppercase(),
            first_name: "OLD".to_string(),
            last_name: "ENTRY".to_string(),
            middle_initial: String::new(),
            date_of_birth: None,
            gender: Gender::Male,
            designation: "RETIRED".to_string(),
            department: "Archive".to_string(),
            role: if id == ADMIN_ID { Role::Admin } else { Role::Employee },
            status: Status::Active,
        },
    }
}

/// In-memory store with injectable failures.
#[derive(Default)]
pub struct FlakyStore {
    inner: InMemoryDirectoryStore,
    failing_deletes: Mutex<HashSet<String>>,
    failing_commits: Mutex<HashSet<usize>>,
    list_failures_from: Mutex<Option<usize>>,
    list_calls: AtomicUsize,
    commit_calls: AtomicUsize,
    commit_sizes: Mutex<Vec<usize>>,
    list_gate: Option<Semaphore>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<DirectoryEntry>) -> Self {
        Self {
            inner: InMemoryDirectoryStore::with_entries(COLLECTION, entries),
            ..Self::default()
        }
    }

    /// Store whose `list_all` waits until [`FlakyStore::open_gate`] is called.
    pub fn gated() -> Self {
        Self {
            list_gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn open_gate(&self) {
        if let Some(gate) = &self.list_gate {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    pub fn fail_delete(&self, id: &str) {
        self.failing_deletes.lock().unwrap().insert(id.to_string());
    }

    /// Fail the `n`th (0-based) batch commit.
    pub fn fail_commit(&self, n: usize) {
        self.failing_commits.lock().unwrap().insert(n);
    }

    /// Fail every `list_all` from the `n`th (0-based) call on.
    pub fn fail_list_from(&self, n: usize) {
        *self.failing_list_lock() = Some(n);
    }

    fn failing_list_lock(&self) -> std::sync::MutexGuard<'_, Option<usize>> {
        self.list_failures_from.lock().unwrap()
    }

    /// Sizes of the batch commits that reached the store, failed ones included.
    pub fn commit_sizes(&self) -> Vec<usize> {
        self.commit_sizes.lock().unwrap().clone()
    }

    pub async fn entries(&self) -> Vec<DirectoryEntry> {
        self.inner.list_all(COLLECTION).await.unwrap()
    }

    pub async fn ids(&self) -> Vec<String> {
        self.entries().await.into_iter().map(|e| e.id).collect()
    }

    pub async fn record(&self, id: &str) -> Option<EmployeeRecord> {
        self.inner
            .list_all(COLLECTION)
            .await
            .unwrap()
            .into_iter()
            .find(|e| e.id == id)
            .map(|e| e.record)
    }
}

#[async_trait]
impl DirectoryStore for FlakyStore {
    fn store_type(&self) -> &'static str {
        "flaky"
    }

    async fn list_all(&self, collection: &str) -> StoreResult<Vec<DirectoryEntry>> {
        if let Some(gate) = &self.list_gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        }
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst);
        if matches!(*self.failing_list_lock(), Some(from) if call >= from) {
            return Err(StoreError::Unavailable("list timed out".to_string()));
        }
        self.inner.list_all(collection).await
    }

    async fn upsert(&self, collection: &str, id: &str, record: &EmployeeRecord) -> StoreResult<()> {
        self.inner.upsert(collection, id, record).await
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        if self.failing_deletes.lock().unwrap().contains(id) {
            return Err(StoreError::Unavailable(format!("delete of {id} refused")));
        }
        self.inner.delete(collection, id).await
    }

    async fn commit_batch(&self, collection: &str, records: &[EmployeeRecord]) -> StoreResult<()> {
        check_batch_size(records.len())?;
        let call = self.commit_calls.fetch_add(1, Ordering::SeqCst);
        self.commit_sizes.lock().unwrap().push(records.len());
        if self.failing_commits.lock().unwrap().contains(&call) {
            return Err(StoreError::Unavailable("commit aborted".to_string()));
        }
        self.inner.commit_batch(collection, records).await
    }
}

/// Store, slot and service wired together.
pub struct TestContext {
    pub store: Arc<FlakyStore>,
    pub slot: Arc<MemorySlot>,
    pub service: Arc<ImportService>,
}

impl TestContext {
    pub fn new(store: FlakyStore) -> Self {
        Self::with_config(store, MemorySlot::new(), ImportConfig::default())
    }

    pub fn with_config(store: FlakyStore, slot: MemorySlot, config: ImportConfig) -> Self {
        init_test_logging();
        let store = Arc::new(store);
        let slot = Arc::new(slot);
        let cache = DirectoryCache::with_ttl(slot.clone(), config.cache_ttl_secs);
        let service = Arc::new(ImportService::new(store.clone(), cache, config));
        Self {
            store,
            slot,
            service,
        }
    }
}
