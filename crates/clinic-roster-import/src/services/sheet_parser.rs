//! Spreadsheet parsing for the roster import.
//!
//! Opens the first worksheet of an XLSX / XLS / ODS payload and yields data
//! rows lazily. Columns are addressed by fixed position, not by header name:
//! the layout is a contract with the upstream HR roster template, recorded in
//! [`RosterColumns::TEMPLATE`].

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};

use crate::error::ImportError;
use crate::models::{RawCell, RawRow};

/// Maximum data rows read per import (100 default, configurable).
pub const DEFAULT_MAX_ROWS: usize = 100;

/// Leading rows of the template that hold headings rather than data.
pub const DEFAULT_HEADER_ROWS: usize = 1;

/// 0-based column positions of the roster template.
///
/// The template's other columns (sequence number, contact details, hire
/// data) are ignored by the import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterColumns {
    pub employee_id: usize,
    /// `LAST, First M.` or `LAST, First`.
    pub full_name: usize,
    pub date_of_birth: usize,
    pub gender: usize,
    pub designation: usize,
    pub department: usize,
}

impl RosterColumns {
    /// Column layout of the HR roster export (B, C, D, E, M, N).
    pub const TEMPLATE: Self = Self {
        employee_id: 1,
        full_name: 2,
        date_of_birth: 3,
        gender: 4,
        designation: 12,
        department: 13,
    };

    /// Number of cells needed to cover every mapped column.
    #[must_use]
    pub fn width(&self) -> usize {
        [
            self.employee_id,
            self.full_name,
            self.date_of_birth,
            self.gender,
            self.designation,
            self.department,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

impl Default for RosterColumns {
    fn default() -> Self {
        Self::TEMPLATE
    }
}

/// Configuration for sheet parsing.
#[derive(Debug, Clone)]
pub struct SheetParseConfig {
    /// Stop after this many data rows. Default: 100
    pub max_rows: usize,
    /// Rows skipped before the first data row. Default: 1
    pub header_rows: usize,
    pub columns: RosterColumns,
}

impl SheetParseConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            header_rows: DEFAULT_HEADER_ROWS,
            columns: RosterColumns::TEMPLATE,
        }
    }

    /// Set the maximum data rows.
    #[must_use]
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Set the number of heading rows to skip.
    #[must_use]
    pub fn with_header_rows(mut self, header_rows: usize) -> Self {
        self.header_rows = header_rows;
        self
    }

    /// Use a different column layout.
    #[must_use]
    pub fn with_columns(mut self, columns: RosterColumns) -> Self {
        self.columns = columns;
        self
    }
}

impl Default for SheetParseConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy iterator over the data rows of a worksheet.
///
/// Ends at the first row whose employee-ID cell is blank, at the end of the
/// used range, or once `max_rows` rows have been yielded.
#[derive(Debug)]
pub struct SheetRows {
    range: Range<Data>,
    next_row: u32,
    last_row: Option<u32>,
    width: usize,
    id_column: usize,
    remaining: usize,
    stopped_at_blank: bool,
}

impl SheetRows {
    /// Whether iteration ended on a blank employee-ID cell.
    #[must_use]
    pub fn stopped_at_blank(&self) -> bool {
        self.stopped_at_blank
    }

    /// Whether the row cap has been reached.
    #[must_use]
    pub fn cap_reached(&self) -> bool {
        self.remaining == 0
    }

    fn read_row(&self, row: u32) -> RawRow {
        let cells = (0..self.width)
            .map(|col| {
                u32::try_from(col)
                    .ok()
                    .and_then(|col| self.range.get_value((row, col)))
                    .map(to_raw_cell)
                    .unwrap_or_default()
            })
            .collect();
        RawRow::new(row as usize + 1, cells)
    }
}

impl Iterator for SheetRows {
    type Item = RawRow;

    fn next(&mut self) -> Option<RawRow> {
        if self.remaining == 0 || self.stopped_at_blank {
            return None;
        }
        let last_row = self.last_row?;
        if self.next_row > last_row {
            return None;
        }

        let row = self.read_row(self.next_row);
        self.next_row += 1;

        if row.cell(self.id_column).is_blank() {
            self.stopped_at_blank = true;
            return None;
        }

        self.remaining -= 1;
        Some(row)
    }
}

/// Open the first worksheet of a spreadsheet payload.
///
/// File extension and size checks belong to the caller; this only fails when
/// the bytes are not a spreadsheet container or the container is empty.
pub fn open_sheet(data: &[u8], config: &SheetParseConfig) -> Result<SheetRows, ImportError> {
    if data.is_empty() {
        return Err(ImportError::Parse("file is empty".to_string()));
    }

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))
        .map_err(|e| ImportError::Parse(e.to_string()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => range,
        Some(Err(e)) => return Err(ImportError::Parse(e.to_string())),
        None => return Err(ImportError::EmptyWorkbook),
    };

    let first_data_row = u32::try_from(config.header_rows)
        .map_err(|_| ImportError::Parse("header row count out of range".to_string()))?;

    Ok(SheetRows {
        last_row: range.end().map(|(row, _)| row),
        range,
        next_row: first_data_row,
        width: config.columns.width(),
        id_column: config.columns.employee_id,
        remaining: config.max_rows,
        stopped_at_blank: false,
    })
}

/// Read every data row of the first worksheet.
pub fn read_rows(data: &[u8], config: &SheetParseConfig) -> Result<Vec<RawRow>, ImportError> {
    let rows = open_sheet(data, config)?;
    Ok(rows.collect())
}

fn to_raw_cell(data: &Data) -> RawCell {
    match data {
        Data::Empty | Data::Error(_) => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Bool(*b),
        Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    /// Build an XLSX payload with a heading row and one row per entry of
    /// `ids`, filling ID (B), name (C) and gender (E).
    fn workbook_with_ids(ids: &[&str]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 1, "Employee No.").unwrap();
        sheet.write_string(0, 2, "Name").unwrap();
        for (i, id) in ids.iter().enumerate() {
            let row = (i + 1) as u32;
            if !id.is_empty() {
                sheet.write_string(row, 1, *id).unwrap();
            }
            sheet.write_string(row, 2, "Santos, Juan D.").unwrap();
            sheet.write_string(row, 4, "M").unwrap();
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_template_width_covers_department() {
        assert_eq!(RosterColumns::TEMPLATE.width(), 14);
    }

    #[test]
    fn test_open_sheet_rejects_garbage() {
        let result = open_sheet(b"definitely not a spreadsheet", &SheetParseConfig::new());
        assert!(matches!(result, Err(ImportError::Parse(_))));
    }

    #[test]
    fn test_open_sheet_rejects_empty_payload() {
        let result = open_sheet(b"", &SheetParseConfig::new());
        match result {
            Err(ImportError::Parse(msg)) => assert!(msg.contains("empty")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_skips_header_and_reads_columns_by_position() {
        let data = workbook_with_ids(&["E-001", "E-002"]);
        let rows = read_rows(&data, &SheetParseConfig::new()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line_number, 2);
        assert_eq!(rows[0].cell(1), &RawCell::Text("E-001".to_string()));
        assert_eq!(
            rows[0].cell(2),
            &RawCell::Text("Santos, Juan D.".to_string())
        );
        assert_eq!(rows[0].cell(0), &RawCell::Empty);
        assert_eq!(rows[0].cells.len(), 14);
    }

    #[test]
    fn test_stops_at_first_blank_id() {
        let data = workbook_with_ids(&["E-001", "", "E-003"]);
        let mut rows = open_sheet(&data, &SheetParseConfig::new()).unwrap();
        assert!(rows.next().is_some());
        assert!(rows.next().is_none());
        assert!(rows.stopped_at_blank());
        assert!(rows.next().is_none());
    }

    #[test]
    fn test_row_cap() {
        let ids: Vec<String> = (0..150).map(|i| format!("E-{i:03}")).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let data = workbook_with_ids(&refs);

        let mut rows = open_sheet(&data, &SheetParseConfig::new()).unwrap();
        let read: Vec<RawRow> = rows.by_ref().collect();
        assert_eq!(read.len(), DEFAULT_MAX_ROWS);
        assert!(rows.cap_reached());

        let config = SheetParseConfig::new().with_max_rows(10);
        assert_eq!(read_rows(&data, &config).unwrap().len(), 10);
    }

    #[test]
    fn test_numeric_cells_surface_as_numbers() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_number(1, 1, 1001).unwrap();
        sheet.write_number(1, 3, 44197).unwrap();
        let data = workbook.save_to_buffer().unwrap();

        let rows = read_rows(&data, &SheetParseConfig::new()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cell(1).as_text().as_deref(), Some("1001"));
        assert_eq!(rows[0].cell(3), &RawCell::Number(44197.0));
    }

    #[test]
    fn test_no_header_rows() {
        let data = workbook_with_ids(&["E-001"]);
        let config = SheetParseConfig::new().with_header_rows(0);
        let rows = read_rows(&data, &config).unwrap();
        // The heading row now counts as data.
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cell(1).as_text().as_deref(), Some("Employee No."));
    }
}
