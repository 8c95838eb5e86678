//! Final projection of consolidated records and match results into the
//! output table.

use std::collections::HashMap;

use crate::model::{ClientRecord, MatchResult, OutputTable};

/// Sheet name of the reconciliation output.
pub const OUTPUT_SHEET: &str = "Reconciliation";

/// Output columns, in order.
pub const OUTPUT_COLUMNS: [&str; 5] = [
    "Client",
    "Last Date of Service",
    "Status A",
    "Roster Status",
    "Status B",
];

/// Projects one output row per client record, in the consolidation order
/// (ascending client id). Null values render as empty cells; dates render
/// as `YYYY-MM-DD`.
pub fn build_output(
    clients: &[ClientRecord],
    matches_a: &[MatchResult],
    matches_b: &[MatchResult],
) -> OutputTable {
    let status_a = status_by_client(matches_a);
    let status_b = status_by_client(matches_b);

    let rows = clients
        .iter()
        .map(|client| {
            vec![
                client.name.clone().unwrap_or_default(),
                client
                    .last_service
                    .map(|date| date.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                lookup(&status_a, &client.client_id),
                client.status.clone().unwrap_or_default(),
                lookup(&status_b, &client.client_id),
            ]
        })
        .collect();

    OutputTable {
        sheet_name: OUTPUT_SHEET.to_string(),
        columns: OUTPUT_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

fn status_by_client(matches: &[MatchResult]) -> HashMap<&str, &str> {
    matches
        .iter()
        .filter_map(|result| {
            result
                .status
                .as_deref()
                .map(|status| (result.client_id.as_str(), status))
        })
        .collect()
}

fn lookup(statuses: &HashMap<&str, &str>, client_id: &str) -> String {
    statuses.get(client_id).map(|s| s.to_string()).unwrap_or_default()
}
