//! Spreadsheet reader - binary workbook → [`Workbook`] of loosely-typed rows

use crate::error::{AdvisorError, AdvisorResult};
use crate::types::{CellValue, RawRow, Sheet, Workbook};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

/// Header name given to a column whose header cell is blank
const EMPTY_HEADER: &str = "__EMPTY";

/// Decode a spreadsheet payload (xlsx, xlsm, xlsb, xls or ods).
///
/// Sheets come back in file order. The first row of each sheet is the header
/// record; every following row becomes a [`RawRow`] keyed by those headers.
/// Individual cells never fail the decode: blank and error cells are left out
/// of their row.
pub fn read_workbook(bytes: &[u8]) -> AdvisorResult<Workbook> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| AdvisorError::Decode(format!("Not a readable spreadsheet: {}", e)))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for sheet_name in sheet_names {
        // Keep a placeholder for unreadable sheets so positions never shift
        let sheet = match workbook.worksheet_range(&sheet_name) {
            Ok(range) => read_sheet(&sheet_name, &range),
            Err(e) => {
                warn!(sheet = %sheet_name, error = %e, "Sheet could not be read, treating as empty");
                Sheet::new(sheet_name.clone())
            }
        };
        debug!(sheet = %sheet.name, rows = sheet.rows.len(), "Decoded sheet");
        sheets.push(sheet);
    }

    Ok(Workbook::new(sheets))
}

/// Read a spreadsheet file from disk and decode it
pub fn read_workbook_file<P: AsRef<Path>>(path: P) -> AdvisorResult<Workbook> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        AdvisorError::Decode(format!("Failed to read {}: {}", path.display(), e))
    })?;
    read_workbook(&bytes)
}

/// Turn one worksheet range into header-keyed rows
fn read_sheet(sheet_name: &str, range: &Range<Data>) -> Sheet {
    let mut rows_iter = range.rows();

    let headers = match rows_iter.next() {
        Some(header_row) => header_names(header_row),
        None => return Sheet::new(sheet_name),
    };

    let rows = rows_iter
        .filter_map(|cells| {
            let row: RawRow = headers
                .iter()
                .zip(cells)
                .filter_map(|(header, cell)| cell_value(cell).map(|v| (header.clone(), v)))
                .collect();
            // Rows without a single non-empty value are not data
            if row.headers().all(|h| row.get(h).is_some_and(CellValue::is_empty)) {
                None
            } else {
                Some(row)
            }
        })
        .collect();

    Sheet::with_rows(sheet_name, rows)
}

/// Header names for the first row: blanks become `__EMPTY`, repeats get the
/// first free numeric suffix (`Grade`, `Grade_1`, ...). Names are unique
/// within the row, so no column can shadow another.
fn header_names(cells: &[Data]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();

    cells
        .iter()
        .map(|cell| {
            let base = cell_value(cell)
                .map(|v| v.to_text())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| EMPTY_HEADER.to_string());

            let mut name = base.clone();
            if used.contains(&name) {
                let counter = counters.entry(base.clone()).or_insert(0);
                loop {
                    *counter += 1;
                    name = format!("{}_{}", base, counter);
                    if !used.contains(&name) {
                        break;
                    }
                }
            }
            used.insert(name.clone());
            name
        })
        .collect()
}

/// Map a calamine cell to a loosely-typed value; `None` means absent
fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        // Dates stay as their serial number, like any other numeric cell
        Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(_) | Data::Empty => None,
    }
}
