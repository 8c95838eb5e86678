//! Identity consolidation: collapse duplicate roster rows into one
//! canonical record per client.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::aggregate::INSURANCE_ID;
use crate::error::Result;
use crate::model::{ClientRecord, RowSet};
use crate::normalize::normalize_name;

/// Column holding the client identifier.
pub const CLIENT_ID: &str = "Client ID";
/// Column holding the client name on roster rows.
pub const CLIENT: &str = "Client";
/// Optional column holding the roster status.
pub const STATUS: &str = "Status";

/// Joins roster and identifier rows and collapses duplicates into exactly
/// one [`ClientRecord`] per unique client id.
///
/// The client → insurance map is built first-occurrence-wins over the
/// identifier rows in original order. Within a roster group, name,
/// insurance id, and status are each selected independently as the first
/// non-null value in original row order. Records come back sorted
/// ascending by client id, which fixes the output row order downstream.
///
/// Fails only when a required column is absent from either input.
pub fn consolidate(
    roster: &RowSet,
    identifiers: &RowSet,
    last_service: &HashMap<String, NaiveDate>,
) -> Result<Vec<ClientRecord>> {
    roster.require_columns(&[CLIENT_ID, CLIENT])?;
    identifiers.require_columns(&[CLIENT_ID, INSURANCE_ID])?;

    // First occurrence wins: later duplicates never replace the mapping,
    // even when the first row carries no insurance id at all.
    let mut insurance_by_client: HashMap<String, Option<String>> = HashMap::new();
    for row in &identifiers.rows {
        let Some(client_id) = RowSet::cell(row, CLIENT_ID).as_text() else {
            continue;
        };
        insurance_by_client
            .entry(client_id)
            .or_insert_with(|| RowSet::cell(row, INSURANCE_ID).as_text());
    }

    let has_status = roster.has_column(STATUS);
    let mut records: Vec<ClientRecord> = Vec::new();
    let mut index_by_client: HashMap<String, usize> = HashMap::new();

    for row in &roster.rows {
        let Some(client_id) = RowSet::cell(row, CLIENT_ID).as_text() else {
            continue;
        };
        let index = *index_by_client.entry(client_id.clone()).or_insert_with(|| {
            records.push(ClientRecord {
                client_id: client_id.clone(),
                name: None,
                normalized_name: String::new(),
                insurance_id: insurance_by_client.get(&client_id).cloned().flatten(),
                status: None,
                last_service: None,
            });
            records.len() - 1
        });

        let record = &mut records[index];
        if record.name.is_none() {
            record.name = RowSet::cell(row, CLIENT).as_text();
        }
        if has_status && record.status.is_none() {
            record.status = RowSet::cell(row, STATUS).as_text();
        }
    }

    for record in &mut records {
        record.last_service = record
            .insurance_id
            .as_ref()
            .and_then(|insurance_id| last_service.get(insurance_id))
            .copied();
        record.normalized_name = normalize_name(record.name.as_deref());
    }

    records.sort_by(|lhs, rhs| client_id_order(&lhs.client_id, &rhs.client_id));
    debug!(clients = records.len(), "consolidated roster rows");
    Ok(records)
}

/// Ascending client id order. Ids that parse as finite numbers compare
/// numerically and sort before textual ids (spreadsheet exports store them
/// as numeric cells); everything else orders lexicographically. Non-finite
/// parses such as `NaN` or `inf` count as textual, keeping the comparison
/// a total order.
fn client_id_order(lhs: &str, rhs: &str) -> Ordering {
    match (numeric_id(lhs), numeric_id(rhs)) {
        (Some(a), Some(b)) => a
            .partial_cmp(&b)
            .unwrap_or(Ordering::Equal)
            .then_with(|| lhs.cmp(rhs)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => lhs.cmp(rhs),
    }
}

fn numeric_id(id: &str) -> Option<f64> {
    id.parse::<f64>().ok().filter(|value| value.is_finite())
}
