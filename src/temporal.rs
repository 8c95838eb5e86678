//! Permissive coercion of date-like values into calendar dates.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::model::CellValue;

/// Year-first formats, only attempted when the text leads with a
/// four-digit year: chrono's `%Y` greedily accepts one- and two-digit
/// years, which would capture short-year month-first dates as ancient ISO
/// dates.
const YEAR_FIRST_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Month-first formats tried in order. Ambiguous numeric forms resolve
/// with the month before the day. The `%y` forms come first for the same
/// greediness reason: `%y` fails on a four-digit year (two digits are left
/// unconsumed), but `%Y` happily swallows a two-digit one.
const MONTH_FIRST_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%m-%d-%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Year-first datetime formats, gated like [`YEAR_FIRST_FORMATS`]. The
/// time-of-day component is discarded.
const YEAR_FIRST_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Month-first datetime formats whose time-of-day component is discarded.
/// Short-year forms first, as in [`MONTH_FIRST_FORMATS`].
const MONTH_FIRST_DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
];

/// Excel serial day numbers count from this epoch.
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Coerces a date-like cell into a calendar date. Structured dates pass
/// through, numeric cells are read as Excel serial day numbers, and text is
/// parsed permissively. Returns `None` on anything unparseable; never
/// fails.
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(date) => Some(*date),
        CellValue::Number(serial) => serial_to_date(*serial),
        CellValue::Text(text) => parse_date_text(text),
        CellValue::Boolean(_) | CellValue::Empty => None,
    }
}

/// Parses a textual date in any of the supported human formats.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if leads_with_four_digit_year(trimmed) {
        for format in YEAR_FIRST_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
                return Some(date);
            }
        }
        for format in YEAR_FIRST_DATETIME_FORMATS {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Some(datetime.date());
            }
        }
    }
    for format in MONTH_FIRST_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in MONTH_FIRST_DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }
    None
}

fn leads_with_four_digit_year(text: &str) -> bool {
    text.chars().take_while(|ch| ch.is_ascii_digit()).count() == 4
}

/// Converts an Excel serial day number to a date. Values outside the range
/// Excel itself can represent are rejected rather than mapped to
/// implausible dates.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > 2_958_465.0 {
        return None;
    }
    let (year, month, day) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(year, month, day)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn parses_iso_order() {
        assert_eq!(parse_date_text("2023-06-15"), Some(date(2023, 6, 15)));
        assert_eq!(parse_date_text("2023/06/15"), Some(date(2023, 6, 15)));
    }

    #[test]
    fn ambiguous_numeric_forms_read_month_first() {
        assert_eq!(parse_date_text("03/04/2023"), Some(date(2023, 3, 4)));
        assert_eq!(parse_date_text("3-4-23"), Some(date(2023, 3, 4)));
    }

    #[test]
    fn short_years_are_not_mistaken_for_iso_years() {
        assert_eq!(parse_date_text("3/4/23"), Some(date(2023, 3, 4)));
        assert_eq!(parse_date_text("03/04/23"), Some(date(2023, 3, 4)));
        assert_eq!(parse_date_text("12-25-24"), Some(date(2024, 12, 25)));
    }

    #[test]
    fn parses_month_names() {
        assert_eq!(parse_date_text("June 15, 2023"), Some(date(2023, 6, 15)));
        assert_eq!(parse_date_text("Jun 15 2023"), Some(date(2023, 6, 15)));
        assert_eq!(parse_date_text("15 June 2023"), Some(date(2023, 6, 15)));
    }

    #[test]
    fn datetime_text_keeps_only_the_date() {
        assert_eq!(
            parse_date_text("2023-06-15 00:00:00"),
            Some(date(2023, 6, 15))
        );
        assert_eq!(
            parse_date_text("6/15/2023 09:30"),
            Some(date(2023, 6, 15))
        );
    }

    #[test]
    fn garbage_is_unparseable_not_an_error() {
        assert_eq!(parse_date_text("pending"), None);
        assert_eq!(parse_date_text(""), None);
        assert_eq!(parse_date(&CellValue::Empty), None);
        assert_eq!(parse_date(&CellValue::Boolean(true)), None);
    }

    #[test]
    fn numeric_cells_read_as_excel_serials() {
        // 45292 days after 1899-12-30.
        assert_eq!(
            parse_date(&CellValue::Number(45292.0)),
            Some(date(2024, 1, 1))
        );
        assert_eq!(parse_date(&CellValue::Number(-3.0)), None);
    }

    #[test]
    fn structured_dates_pass_through() {
        assert_eq!(
            parse_date(&CellValue::Date(date(2024, 3, 5))),
            Some(date(2024, 3, 5))
        );
    }
}
