//! Batch orchestration: row collections in, reconciliation table out.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::aggregate;
use crate::assemble;
use crate::consolidate;
use crate::error::Result;
use crate::io::{excel_read, excel_write};
use crate::matching::{self, MatchConfig};
use crate::model::{OutputTable, RowSet};

/// Labels carried on match results for the two external sources.
const SOURCE_A: &str = "A";
const SOURCE_B: &str = "B";

/// Summary of a completed file-level run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileSummary {
    /// Number of unique clients in the output table.
    pub clients: usize,
}

/// Runs the full reconciliation over in-memory row collections.
///
/// Single-threaded, synchronous, and deterministic: identical inputs
/// produce an identical table. Only missing required columns abort the
/// run; per-row anomalies degrade to empty cells.
pub fn reconcile(
    appointments: &RowSet,
    roster: &RowSet,
    source_a: &RowSet,
    source_b: &RowSet,
    config: &MatchConfig,
) -> Result<OutputTable> {
    let last_service = aggregate::last_service_dates(appointments)?;
    let clients = consolidate::consolidate(roster, appointments, &last_service)?;

    let entries_a = matching::prepare_source(source_a)?;
    let entries_b = matching::prepare_source(source_b)?;
    let matches_a = matching::match_source(&clients, &entries_a, SOURCE_A, config);
    let matches_b = matching::match_source(&clients, &entries_b, SOURCE_B, config);

    Ok(assemble::build_output(&clients, &matches_a, &matches_b))
}

/// Loads the four input workbooks, reconciles them, and writes the output
/// workbook.
#[instrument(
    level = "info",
    skip_all,
    fields(output = %output.display())
)]
pub fn reconcile_files(
    appointments: &Path,
    roster: &Path,
    source_a: &Path,
    source_b: &Path,
    output: &Path,
    config: &MatchConfig,
) -> Result<ReconcileSummary> {
    let appointments = excel_read::read_table(appointments, "Appointments")?;
    let mut roster = excel_read::read_table(roster, "Roster")?;
    let source_a = excel_read::read_table(source_a, "Source A")?;
    let source_b = excel_read::read_table(source_b, "Source B")?;
    info!(
        appointment_rows = appointments.rows.len(),
        roster_rows = roster.rows.len(),
        source_a_rows = source_a.rows.len(),
        source_b_rows = source_b.rows.len(),
        "loaded input workbooks"
    );

    // Some roster exports spell the id header differently.
    roster.rename_column("Client Id", consolidate::CLIENT_ID);

    let table = reconcile(&appointments, &roster, &source_a, &source_b, config)?;
    debug!(rows = table.rows.len(), "reconciliation table built");
    excel_write::write_table(output, &table)?;
    info!(clients = table.rows.len(), "output workbook written");

    Ok(ReconcileSummary {
        clients: table.rows.len(),
    })
}
