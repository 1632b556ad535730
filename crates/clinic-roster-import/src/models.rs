//! Domain models for the roster import.
//!
//! Raw spreadsheet cells flow through an explicit [`RawRow`] ->
//! [`EmployeeRecord`] transformation; everything persisted or cached derives
//! serde so the stores and the cache share one representation.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{NoticeLevel, Notification};

// ---------------------------------------------------------------------------
// Raw spreadsheet rows
// ---------------------------------------------------------------------------

/// A single cell as read from the spreadsheet, before normalization.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawCell {
    #[default]
    Empty,
    Text(String),
    /// Numbers, including date cells which surface as their day serial.
    Number(f64),
    Bool(bool),
}

impl RawCell {
    /// Whether the cell holds nothing but whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            RawCell::Number(_) | RawCell::Bool(_) => false,
        }
    }

    /// Render the cell as trimmed text; `None` when blank.
    ///
    /// Integral numbers render without a fractional part so numeric
    /// employee IDs such as `1001` do not become `1001.0`.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            RawCell::Empty => return None,
            RawCell::Text(s) => s.trim().to_string(),
            RawCell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            RawCell::Number(n) => n.to_string(),
            RawCell::Bool(b) => b.to_string(),
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// One spreadsheet data row, addressed by 0-based column position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRow {
    /// 1-based sheet row number, for log context.
    pub line_number: usize,
    pub cells: Vec<RawCell>,
}

impl RawRow {
    #[must_use]
    pub fn new(line_number: usize, cells: Vec<RawCell>) -> Self {
        Self { line_number, cells }
    }

    /// Cell at `column`; missing trailing cells read as empty.
    #[must_use]
    pub fn cell(&self, column: usize) -> &RawCell {
        static EMPTY: RawCell = RawCell::Empty;
        self.cells.get(column).unwrap_or(&EMPTY)
    }
}

// ---------------------------------------------------------------------------
// Canonical employee record
// ---------------------------------------------------------------------------

/// Normalized gender value.
///
/// Values that match neither `Male` nor `Female` (even by first letter) are
/// kept verbatim, capitalized, as `Unrecognized`. `Unspecified` is for
/// entries created outside the roster, such as the administrative entry; it
/// serializes as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    Unrecognized(String),
    Unspecified,
}

impl Gender {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Unrecognized(raw) => raw,
            Gender::Unspecified => "",
        }
    }

    /// Whether the value is one of the two recognized genders.
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        matches!(self, Gender::Male | Gender::Female)
    }
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Male" => Gender::Male,
            "Female" => Gender::Female,
            "" => Gender::Unspecified,
            _ => Gender::Unrecognized(value),
        }
    }
}

impl From<Gender> for String {
    fn from(value: Gender) -> Self {
        match value {
            Gender::Unrecognized(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Console role of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    Admin,
    #[default]
    Employee,
}

/// Account status of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

/// Canonical employee record, as written to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    /// Trimmed, upper-cased; unique key within the directory.
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    /// Zero or one upper-case letter.
    pub middle_initial: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Gender,
    pub designation: String,
    pub department: String,
    pub role: Role,
    pub status: Status,
}

impl EmployeeRecord {
    /// Upper-cased key used for all directory comparisons.
    #[must_use]
    pub fn key(&self) -> String {
        self.employee_id.to_uppercase()
    }

    /// Display name in `LAST, FIRST M.` form.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (self.first_name.is_empty(), self.middle_initial.is_empty()) {
            (true, _) => self.last_name.clone(),
            (false, true) => format!("{}, {}", self.last_name, self.first_name),
            (false, false) => format!(
                "{}, {} {}.",
                self.last_name, self.first_name, self.middle_initial
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Directory snapshot
// ---------------------------------------------------------------------------

/// A record as persisted remotely, with its opaque remote identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Equal to the employee ID, except for the protected administrative entry.
    pub id: String,
    pub record: EmployeeRecord,
}

/// Every entry currently held by the remote directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectorySnapshot {
    pub entries: Vec<DirectoryEntry>,
}

impl DirectorySnapshot {
    #[must_use]
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Upper-cased remote ids of all entries.
    #[must_use]
    pub fn ids(&self) -> HashSet<String> {
        self.entries.iter().map(|e| e.id.to_uppercase()).collect()
    }

    /// Look up an entry by remote id, case-insensitively.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|e| e.id.eq_ignore_ascii_case(id))
    }
}

// ---------------------------------------------------------------------------
// Reconciliation plan and results
// ---------------------------------------------------------------------------

/// Writes needed to make the directory match an imported batch.
///
/// Computed fresh for every import and consumed by the bulk writer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationPlan {
    /// Every batch record, written with full-overwrite semantics.
    pub to_upsert: Vec<EmployeeRecord>,
    /// Remote ids absent from the batch (never the protected id).
    pub to_delete: Vec<String>,
    /// Upper-cased keys of upserts that overwrite an existing entry.
    pub existing_keys: HashSet<String>,
}

impl ReconciliationPlan {
    /// Whether an upsert overwrites an existing directory entry.
    #[must_use]
    pub fn is_update(&self, record: &EmployeeRecord) -> bool {
        self.existing_keys.contains(&record.key())
    }
}

/// Counts produced by the bulk writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSummary {
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
    pub errors: usize,
    /// Whether the post-write directory re-read succeeded.
    pub snapshot_refreshed: bool,
    /// Whether the refreshed snapshot could not be cached.
    pub cache_degraded: bool,
}

impl WriteSummary {
    /// Records successfully written (added + updated).
    #[must_use]
    pub fn upserted(&self) -> usize {
        self.added + self.updated
    }
}

/// Result surface of one import, rendered by the console.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// SHA-256 of the uploaded payload (hex).
    pub file_hash: String,
    /// Data rows read from the sheet (after the row cap).
    pub rows_read: usize,
    /// Rows dropped for missing required fields.
    pub rows_skipped: usize,
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub errors: usize,
    pub snapshot_refreshed: bool,
    pub cache_degraded: bool,
}

impl ImportSummary {
    /// Convert to a toast notification.
    #[must_use]
    pub fn to_notification(&self) -> Notification {
        let detail = format!(
            "{} added, {} updated, {} removed, {} errors",
            self.added, self.updated, self.removed, self.errors
        );
        if self.errors > 0 {
            Notification::new(
                "import-partial",
                NoticeLevel::Warning,
                "Import Completed With Errors",
            )
            .with_detail(detail)
        } else if self.cache_degraded {
            Notification::new("import-uncached", NoticeLevel::Warning, "Import Complete")
                .with_detail(format!(
                    "{detail}. The local directory cache is unavailable; \
                     the roster will be reloaded on every visit."
                ))
        } else {
            Notification::new("import-complete", NoticeLevel::Success, "Import Complete")
                .with_detail(detail)
        }
    }
}
