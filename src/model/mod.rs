use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ReconError, Result};

/// Represents a single cell value exchanged with the spreadsheet
/// collaborator. Intentionally schema-free: every input column arrives as a
/// plain `CellValue` and is coerced by the component that consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    /// Plain string cell.
    Text(String),
    /// Numeric cell.
    Number(f64),
    /// Boolean cell.
    Boolean(bool),
    /// Date cell already resolved to a calendar date.
    Date(NaiveDate),
    /// Empty or unreadable cell.
    Empty,
}

impl CellValue {
    /// Returns the trimmed textual content of the cell, or `None` when the
    /// cell is empty or blank. Integral numbers render without a trailing
    /// `.0` so identifiers read from numeric cells compare equal to the
    /// same identifiers stored as text in another workbook.
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            CellValue::Text(value) => value.trim().to_string(),
            CellValue::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    format!("{}", *value as i64)
                } else {
                    value.to_string()
                }
            }
            CellValue::Boolean(value) => value.to_string(),
            CellValue::Date(value) => value.format("%Y-%m-%d").to_string(),
            CellValue::Empty => return None,
        };
        if text.is_empty() { None } else { Some(text) }
    }

    /// True when the cell carries no usable value.
    pub fn is_empty(&self) -> bool {
        self.as_text().is_none()
    }
}

/// A single schema-free input row: field name → cell value.
pub type RawRow = BTreeMap<String, CellValue>;

/// An ordered collection of rows sharing one header, as loaded from a
/// single input source. Row order is the original source order; the
/// "first occurrence wins" and "first non-null wins" rules downstream
/// depend on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    /// Label identifying the source, used in schema error messages.
    pub source: String,
    /// Header columns in sheet order.
    pub columns: Vec<String>,
    /// Data rows in original order.
    pub rows: Vec<RawRow>,
}

impl RowSet {
    /// Creates an empty row set with the provided source label and columns.
    pub fn new(source: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            source: source.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// True when the header contains the named column.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    /// Verifies that every required column is present, failing with a
    /// schema error naming all missing columns at once.
    pub fn require_columns(&self, required: &[&str]) -> Result<()> {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| !self.has_column(name))
            .map(|name| name.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ReconError::MissingColumns {
                input: self.source.clone(),
                columns: missing,
            })
        }
    }

    /// Renames a header column, rewriting every row key to match. Sources
    /// exported by different systems disagree on header spelling (the
    /// roster ships `Client Id` where the rest use `Client ID`).
    pub fn rename_column(&mut self, from: &str, to: &str) {
        if !self.has_column(from) || self.has_column(to) {
            return;
        }
        for column in &mut self.columns {
            if column == from {
                *column = to.to_string();
            }
        }
        for row in &mut self.rows {
            if let Some(value) = row.remove(from) {
                row.insert(to.to_string(), value);
            }
        }
    }

    /// Returns the cell at the named column of a row, defaulting to empty.
    pub fn cell<'a>(row: &'a RawRow, column: &str) -> &'a CellValue {
        row.get(column).unwrap_or(&CellValue::Empty)
    }
}

/// An appointment row that survived parsing: a non-null insurance id and a
/// parsed calendar date, plus the raw status text when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub insurance_id: String,
    pub appt_date: NaiveDate,
    pub status: Option<String>,
}

/// One canonical record per unique client id after consolidation. Created
/// once by the consolidator and afterwards only annotated with match
/// results; never mutated structurally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub client_id: String,
    pub name: Option<String>,
    pub normalized_name: String,
    pub insurance_id: Option<String>,
    pub status: Option<String>,
    pub last_service: Option<NaiveDate>,
}

/// A read-only entry from one external status tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSourceEntry {
    pub name: Option<String>,
    pub normalized_name: String,
    pub insurance_id: Option<String>,
    pub status: Option<String>,
}

/// The transient outcome of resolving one client against one external
/// source. A null status is a normal no-match outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub client_id: String,
    pub source: String,
    pub status: Option<String>,
}

/// A table ready to be materialised as an Excel sheet. Null values render
/// as empty cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
