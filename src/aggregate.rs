//! Appointment aggregation: latest non-excluded service date per
//! insurance id.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::Result;
use crate::model::{AppointmentRecord, RowSet};
use crate::temporal;

/// Status fragments that exclude an appointment from the last-service
/// computation. Matched by substring containment on the case-folded
/// status, not exact equality.
const EXCLUDED_STATUS_FRAGMENTS: &[&str] = &["cancel", "no show", "noshow"];

/// Column holding the insurance identifier on appointment rows.
pub const INSURANCE_ID: &str = "Insurance ID";
/// Column holding the appointment date on appointment rows.
pub const APPT_DATE: &str = "Appt. Date";
/// Optional column holding the appointment status.
pub const STATUS: &str = "Status";

/// Computes the latest date of service per insurance id.
///
/// Fails with a schema error when the insurance id or appointment date
/// column is absent. Rows with a missing insurance id or an unparseable
/// date are dropped. When the row set carries a `Status` column, rows
/// whose status indicates a cancellation or no-show are dropped as well; a
/// row with a blank status is kept. The remaining rows fold into running
/// maxima, so the pass is O(n) and independent of row order.
pub fn last_service_dates(appointments: &RowSet) -> Result<HashMap<String, NaiveDate>> {
    appointments.require_columns(&[INSURANCE_ID, APPT_DATE])?;
    let has_status = appointments.has_column(STATUS);
    let mut latest: HashMap<String, NaiveDate> = HashMap::new();
    let mut kept = 0usize;

    for row in &appointments.rows {
        let Some(insurance_id) = RowSet::cell(row, INSURANCE_ID).as_text() else {
            continue;
        };
        let Some(appt_date) = temporal::parse_date(RowSet::cell(row, APPT_DATE)) else {
            continue;
        };
        let status = if has_status {
            RowSet::cell(row, STATUS).as_text()
        } else {
            None
        };
        let record = AppointmentRecord {
            insurance_id,
            appt_date,
            status,
        };
        if is_excluded(&record) {
            continue;
        }
        kept += 1;

        let AppointmentRecord {
            insurance_id,
            appt_date,
            ..
        } = record;
        latest
            .entry(insurance_id)
            .and_modify(|current| {
                if appt_date > *current {
                    *current = appt_date;
                }
            })
            .or_insert(appt_date);
    }

    debug!(
        kept,
        insurance_ids = latest.len(),
        "aggregated appointment rows"
    );
    Ok(latest)
}

fn is_excluded(record: &AppointmentRecord) -> bool {
    let Some(status) = &record.status else {
        return false;
    };
    let folded = status.to_lowercase();
    EXCLUDED_STATUS_FRAGMENTS
        .iter()
        .any(|fragment| folded.contains(fragment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, RawRow};

    fn appointment_rows(rows: &[(&str, &str, Option<&str>)], with_status: bool) -> RowSet {
        let mut columns = vec![INSURANCE_ID.to_string(), APPT_DATE.to_string()];
        if with_status {
            columns.push(STATUS.to_string());
        }
        let mut set = RowSet::new("Appointments", columns);
        for (insurance_id, date, status) in rows {
            let mut row = RawRow::new();
            row.insert(
                INSURANCE_ID.to_string(),
                if insurance_id.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(insurance_id.to_string())
                },
            );
            row.insert(APPT_DATE.to_string(), CellValue::Text(date.to_string()));
            if let Some(status) = status {
                row.insert(STATUS.to_string(), CellValue::Text(status.to_string()));
            }
            set.rows.push(row);
        }
        set
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn later_no_show_does_not_become_last_service() {
        let rows = appointment_rows(
            &[
                ("I1", "2023-01-01", Some("Completed")),
                ("I1", "2023-06-15", Some("No Show")),
            ],
            true,
        );
        let latest = last_service_dates(&rows).unwrap();
        assert_eq!(latest.get("I1"), Some(&date(2023, 1, 1)));
    }

    #[test]
    fn exclusion_is_substring_containment() {
        let rows = appointment_rows(
            &[
                ("I1", "2023-01-01", Some("Cancelled by client")),
                ("I1", "2023-02-01", Some("NoShow")),
                ("I1", "2023-03-01", Some("Late cancellation")),
                ("I1", "2023-01-15", Some("Completed")),
            ],
            true,
        );
        let latest = last_service_dates(&rows).unwrap();
        assert_eq!(latest.get("I1"), Some(&date(2023, 1, 15)));
    }

    #[test]
    fn blank_status_is_not_exclusionary() {
        let rows = appointment_rows(&[("I1", "2023-04-01", None)], true);
        let latest = last_service_dates(&rows).unwrap();
        assert_eq!(latest.get("I1"), Some(&date(2023, 4, 1)));
    }

    #[test]
    fn missing_status_column_keeps_every_row() {
        let rows = appointment_rows(
            &[("I1", "2023-01-01", None), ("I1", "2023-06-15", None)],
            false,
        );
        let latest = last_service_dates(&rows).unwrap();
        assert_eq!(latest.get("I1"), Some(&date(2023, 6, 15)));
    }

    #[test]
    fn rows_without_id_or_date_are_dropped() {
        let rows = appointment_rows(
            &[
                ("", "2023-01-01", Some("Completed")),
                ("I2", "not a date", Some("Completed")),
            ],
            true,
        );
        assert!(last_service_dates(&rows).unwrap().is_empty());
    }

    #[test]
    fn missing_date_column_is_a_schema_error() {
        let mut rows = RowSet::new("Appointments", vec![INSURANCE_ID.to_string()]);
        let mut row = RawRow::new();
        row.insert(INSURANCE_ID.to_string(), CellValue::Text("I1".to_string()));
        rows.rows.push(row);

        let error = last_service_dates(&rows).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("Appointments"), "got: {message}");
        assert!(message.contains(APPT_DATE), "got: {message}");
    }

    #[test]
    fn maxima_are_tracked_per_insurance_id() {
        let rows = appointment_rows(
            &[
                ("I1", "2023-01-01", Some("Completed")),
                ("I2", "2023-05-01", Some("Completed")),
                ("I1", "2023-03-01", Some("Completed")),
            ],
            true,
        );
        let latest = last_service_dates(&rows).unwrap();
        assert_eq!(latest.get("I1"), Some(&date(2023, 3, 1)));
        assert_eq!(latest.get("I2"), Some(&date(2023, 5, 1)));
    }
}
