//! Row normalization for the roster import.
//!
//! Maps positional raw cells into a canonical [`EmployeeRecord`]. Rows that
//! lack an employee ID, a full name or a gender are skipped, not reported.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};

use crate::models::{EmployeeRecord, Gender, RawCell, RawRow, Role, Status};
use crate::services::sheet_parser::RosterColumns;

/// Days between the spreadsheet date epoch and 1970-01-01.
pub const SPREADSHEET_EPOCH_OFFSET_DAYS: i64 = 25_569;

const SECONDS_PER_DAY: i64 = 86_400;

/// Serials beyond this magnitude are not dates (about 27,000 years).
const MAX_SERIAL_MAGNITUDE: f64 = 1e7;

/// Parts of a `LAST, First M.` full name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameParts {
    pub last_name: String,
    pub first_name: String,
    pub middle_initial: String,
}

/// Result of normalizing a batch of rows.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    /// Unique by employee ID (case-insensitive).
    pub records: Vec<EmployeeRecord>,
    /// Rows dropped for a missing required field.
    pub skipped: usize,
    /// Rows that replaced an earlier row with the same employee ID.
    pub duplicates: usize,
}

/// Split a full name into last, first and middle initial.
///
/// Without a trailing period on the last token, only the first given-name
/// token is kept and the second supplies the initial: `"Reyes, Maria Clara
/// Luz"` becomes `MARIA` / `C`, dropping `Luz`. This mirrors how the roster
/// has always been imported and is pinned by tests.
#[must_use]
pub fn split_full_name(full_name: &str) -> NameParts {
    let Some((last, rest)) = full_name.split_once(',') else {
        return NameParts {
            last_name: full_name.trim().to_uppercase(),
            ..NameParts::default()
        };
    };

    let last_name = last.trim().to_uppercase();
    let tokens: Vec<&str> = rest.split_whitespace().collect();

    let (first_name, middle_initial) = match tokens.split_last() {
        None => (String::new(), String::new()),
        Some((last_token, given)) if last_token.ends_with('.') => {
            (given.join(" "), initial_of(last_token.trim_end_matches('.')))
        }
        Some(_) if tokens.len() > 1 => (tokens[0].to_string(), initial_of(tokens[1])),
        Some((only, _)) => ((*only).to_string(), String::new()),
    };

    NameParts {
        last_name,
        first_name: first_name.to_uppercase(),
        middle_initial,
    }
}

/// First character of `token`, upper-cased, when it is a letter.
fn initial_of(token: &str) -> String {
    token
        .chars()
        .next()
        .filter(|c| c.is_alphabetic())
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

/// Parse a date-of-birth cell.
///
/// Numbers are spreadsheet day serials; text must be `MM/DD/YYYY`. Anything
/// that does not form a valid calendar date yields `None`.
#[must_use]
pub fn parse_birth_date(cell: &RawCell) -> Option<NaiveDate> {
    match cell {
        RawCell::Number(serial) => date_from_serial(*serial),
        RawCell::Text(text) => parse_us_date(text.trim()),
        RawCell::Empty | RawCell::Bool(_) => None,
    }
}

/// Convert a spreadsheet day serial to a calendar date.
#[must_use]
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial.abs() > MAX_SERIAL_MAGNITUDE {
        return None;
    }
    let days = (serial.floor() as i64).checked_sub(SPREADSHEET_EPOCH_OFFSET_DAYS)?;
    let seconds = days.checked_mul(SECONDS_PER_DAY)?;
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.date_naive())
}

fn parse_us_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.split('/');
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Normalize a free-text gender value. Returns `None` for blank input.
#[must_use]
pub fn normalize_gender(raw: &str) -> Option<Gender> {
    let lowered = raw.trim().to_lowercase();
    let mut chars = lowered.chars();
    let first = chars.next()?;
    let capitalized: String = first.to_uppercase().chain(chars).collect();

    Some(match capitalized.as_str() {
        "Male" => Gender::Male,
        "Female" => Gender::Female,
        _ if first == 'm' => Gender::Male,
        _ if first == 'f' => Gender::Female,
        _ => Gender::Unrecognized(capitalized),
    })
}

/// Title-case each whitespace-separated word.
#[must_use]
pub fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let lowered = word.to_lowercase();
            let mut chars = lowered.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Map one raw row to a record; `None` when a required field is missing.
#[must_use]
pub fn normalize_row(row: &RawRow, columns: &RosterColumns) -> Option<EmployeeRecord> {
    let employee_id = row.cell(columns.employee_id).as_text()?.to_uppercase();
    let full_name = row.cell(columns.full_name).as_text()?;
    let gender = normalize_gender(&row.cell(columns.gender).as_text()?)?;

    let NameParts {
        last_name,
        first_name,
        middle_initial,
    } = split_full_name(&full_name);

    Some(EmployeeRecord {
        employee_id,
        first_name,
        last_name,
        middle_initial,
        date_of_birth: parse_birth_date(row.cell(columns.date_of_birth)),
        gender,
        designation: row
            .cell(columns.designation)
            .as_text()
            .unwrap_or_default()
            .to_uppercase(),
        department: title_case(&row.cell(columns.department).as_text().unwrap_or_default()),
        role: Role::Employee,
        status: Status::Active,
    })
}

/// Normalize every row, dropping incomplete rows and collapsing duplicates.
///
/// A later row with the same employee ID replaces the earlier one in place.
pub fn normalize_rows<I>(rows: I, columns: &RosterColumns) -> NormalizedBatch
where
    I: IntoIterator<Item = RawRow>,
{
    let mut batch = NormalizedBatch::default();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let Some(record) = normalize_row(&row, columns) else {
            tracing::debug!(line = row.line_number, "Skipping incomplete roster row");
            batch.skipped += 1;
            continue;
        };

        let key = record.key();
        if let Some(&idx) = positions.get(&key) {
            tracing::debug!(
                line = row.line_number,
                employee_id = %key,
                "Duplicate employee ID in roster; later row wins"
            );
            batch.records[idx] = record;
            batch.duplicates += 1;
        } else {
            positions.insert(key, batch.records.len());
            batch.records.push(record);
        }
    }

    batch
}
