//! Header extraction from uploaded XLSX workbooks.

use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};
use tracing::debug;

use crate::ingest::IngestError;

/// Extracts the column names from an uploaded workbook.
///
/// Only the first row of the first sheet is read. Each non-empty cell becomes
/// one column name, left to right; blank cells are skipped and duplicates are
/// kept as-is. An empty sheet yields an empty list.
pub fn extract_columns(data: &[u8]) -> Result<Vec<String>, IngestError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(data))
        .map_err(|e| IngestError::WorkbookError(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::NoSheet)?
        .map_err(|e| IngestError::WorkbookError(e.to_string()))?;

    let columns = columns_from_range(&range);
    debug!("Extracted {} columns from upload", columns.len());
    Ok(columns)
}

fn columns_from_range(range: &Range<Data>) -> Vec<String> {
    match range.rows().next() {
        Some(header) => header.iter().filter_map(cell_to_column).collect(),
        None => Vec::new(),
    }
}

fn cell_to_column(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                Some(format!("{:.0}", f))
            } else {
                Some(f.to_string())
            }
        }
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(dt.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(_) => None,
    }
}
