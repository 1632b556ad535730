//! Error types for the roster import core.
//!
//! Every error that reaches the console is rendered as a [`Notification`], so
//! no failure is fatal to the hosting application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// Toast-style notification handed to the UI collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Machine-readable kind, e.g. `invalid-spreadsheet`.
    pub kind: String,

    pub level: NoticeLevel,

    /// Short human-readable summary.
    pub title: String,

    /// Longer explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Notification {
    /// Create a new notification without detail.
    #[must_use]
    pub fn new(kind: &str, level: NoticeLevel, title: &str) -> Self {
        Self {
            kind: kind.to_string(),
            level,
            title: title.to_string(),
            detail: None,
        }
    }

    /// Add detail message.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Errors raised by the import workflow itself.
///
/// Per-record write failures are not represented here: they are counted in
/// the summary and never abort an import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The payload is not a readable spreadsheet container.
    #[error("Invalid spreadsheet: {0}")]
    Parse(String),

    /// The container opened but holds no worksheet.
    #[error("Spreadsheet contains no worksheets")]
    EmptyWorkbook,

    /// Another import is already running on this service.
    #[error("Import already in progress")]
    ConcurrentImport,

    /// The directory could not be read before reconciliation.
    #[error("Directory store error: {0}")]
    Store(#[from] StoreError),
}

impl ImportError {
    /// Convert to a user-facing notification.
    pub fn to_notification(&self) -> Notification {
        match self {
            ImportError::Parse(msg) => Notification::new(
                "invalid-spreadsheet",
                NoticeLevel::Error,
                "Invalid Spreadsheet",
            )
            .with_detail(msg.clone()),

            ImportError::EmptyWorkbook => Notification::new(
                "empty-workbook",
                NoticeLevel::Error,
                "Empty Spreadsheet",
            )
            .with_detail("The uploaded file does not contain any worksheet."),

            ImportError::ConcurrentImport => Notification::new(
                "concurrent-import",
                NoticeLevel::Warning,
                "Import In Progress",
            )
            .with_detail("Another import is still running. Please wait for it to complete."),

            ImportError::Store(_) => Notification::new(
                "directory-unavailable",
                NoticeLevel::Error,
                "Directory Unavailable",
            )
            .with_detail("The employee directory could not be read. No changes were made."),
        }
    }
}

/// Errors returned by a [`DirectoryStore`](crate::store::DirectoryStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The remote store could not be reached or refused the call.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The record to delete does not exist.
    #[error("record '{id}' not found in collection '{collection}'")]
    NotFound { collection: String, id: String },

    /// A batch exceeded the per-commit operation ceiling.
    #[error("batch of {size} operations exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from the local key-value slot backing the directory cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Writing would exceed the slot's storage quota.
    #[error("cache capacity exceeded: {needed} bytes requested, {capacity} bytes available")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}
