use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::error::{ReconError, Result};
use crate::model::{CellValue, RawRow, RowSet};
use crate::temporal;

/// Reads the first worksheet of a workbook into a [`RowSet`]. The first
/// row supplies the header; every following row becomes a [`RawRow`] keyed
/// by the trimmed header names. The `label` identifies the source in
/// schema error messages.
pub fn read_table(path: &Path, label: &str) -> Result<RowSet> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReconError::InvalidWorkbook(format!("{label}: workbook has no sheets")))?
        .map_err(ReconError::from)?;

    let headers: Vec<String> = match range.rows().next() {
        Some(first_row) => first_row
            .iter()
            .map(|cell| cell_to_string(cell).trim().to_string())
            .collect(),
        None => Vec::new(),
    };

    let columns: Vec<String> = headers
        .iter()
        .filter(|header| !header.is_empty())
        .cloned()
        .collect();
    let mut rows = RowSet::new(label, columns);

    for row in range.rows().skip(1) {
        let mut raw = RawRow::new();
        let mut any_value = false;
        for (col_idx, cell) in row.iter().enumerate() {
            let header = headers.get(col_idx).cloned().unwrap_or_default();
            if header.is_empty() {
                continue;
            }
            let value = cell_value(cell);
            if !value.is_empty() {
                any_value = true;
            }
            raw.insert(header, value);
        }
        if any_value {
            rows.rows.push(raw);
        }
    }

    Ok(rows)
}

fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(value) => CellValue::Text(value.clone()),
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Bool(value) => CellValue::Boolean(*value),
        DataType::DateTime(serial) => temporal::serial_to_date(*serial)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Empty),
        DataType::Error(_) => CellValue::Empty,
        DataType::Empty => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}

fn cell_to_string(cell: &DataType) -> String {
    cell_value(cell).as_text().unwrap_or_default()
}
