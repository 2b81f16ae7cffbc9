use crate::error::{ImportError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use serde_json::Value;
use std::path::Path;
use tapp_import_common::value::number_value;
use tapp_import_common::Record;

/// Rows of the first worksheet, keyed by the header row.
///
/// Empty cells are omitted, so a blank row yields no record. Date cells
/// become spreadsheet serial numbers and are parsed later by the normalizer.
pub fn read_rows(path: &Path) -> Result<Vec<Record>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::EmptyWorkbook(path.display().to_string()))??;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    Ok(rows
        .map(|row| {
            headers
                .iter()
                .zip(row)
                .filter(|(header, _)| !header.is_empty())
                .filter_map(|(header, cell)| cell_value(cell).map(|v| (header.clone(), v)))
                .collect::<Record>()
        })
        .filter(|record| !record.is_empty())
        .collect())
}

fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            Some(Value::String(s.clone()))
        }
        Data::Int(i) => Some(Value::from(*i)),
        Data::Float(f) => number_value(*f),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => number_value(dt.as_f64()),
        Data::Error(e) => {
            tracing::warn!("Skipping cell with error value {:?}", e);
            None
        }
    }
}
