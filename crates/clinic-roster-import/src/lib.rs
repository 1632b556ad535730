//! Clinic roster import.
//!
//! Reconciles the clinic's employee directory against an HR roster
//! spreadsheet:
//! - Positional parsing of the first worksheet of an XLSX / XLS / ODS upload
//! - Normalization of names, birth dates, gender and department text
//! - Reconciliation against a fresh directory read (the administrative entry
//!   is never deleted)
//! - Bounded batch writes with per-record failure counting
//! - A single-slot, 24-hour local cache of the directory
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use clinic_roster_import::{DirectoryCache, ImportConfig, ImportService, MemorySlot};
//! use clinic_roster_import::store::InMemoryDirectoryStore;
//!
//! let service = ImportService::new(
//!     Arc::new(InMemoryDirectoryStore::new()),
//!     DirectoryCache::new(Arc::new(MemorySlot::new())),
//!     ImportConfig::from_env()?,
//! );
//! let summary = service.import_workbook(&bytes).await?;
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

// Re-export public API
pub use cache::{DirectoryCache, FileSlot, KeyValueSlot, MemorySlot};
pub use config::{ConfigError, ImportConfig};
pub use error::{CacheError, ImportError, NoticeLevel, Notification, StoreError};
pub use models::{DirectorySnapshot, EmployeeRecord, ImportSummary};
pub use services::import_service::{DirectoryRead, ImportService};
pub use store::DirectoryStore;
