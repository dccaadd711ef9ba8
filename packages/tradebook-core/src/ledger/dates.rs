//! Ledger date normalization.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Layouts for values that start with a four-digit year.
const YEAR_FIRST_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Remaining layouts, month-first before day-first.
const DAY_MONTH_FORMATS: [&str; 6] = [
    "%m/%d/%Y", "%m/%d/%y", "%d/%m/%Y", "%d/%m/%y", "%d-%m-%Y", "%d-%m-%y",
];

/// Values spreadsheets write into empty date cells.
const BLANK_MARKERS: [&str; 4] = ["", "none", "nan", "nat"];

/// Parse a ledger date cell in any of the accepted layouts.
///
/// Returns `None` for blank or unparsable input; a bad date never fails the row.
/// Two-digit years are placed in the 2000s.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if BLANK_MARKERS.contains(&value.to_lowercase().as_str()) {
        return None;
    }

    // chrono's %Y accepts short years, so "15-01-24" would otherwise parse as year 15
    let parsed = if starts_with_year(value) {
        YEAR_FIRST_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
            .or_else(|| {
                DATETIME_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                    .map(|dt| dt.date())
            })?
    } else {
        DAY_MONTH_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())?
    };

    if parsed.year() < 100 {
        return parsed.with_year(parsed.year() + 2000);
    }
    Some(parsed)
}

fn starts_with_year(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() > 4 && bytes[..4].iter().all(u8::is_ascii_digit) && !bytes[4].is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_dates() {
        assert_eq!(normalize_date("2024-01-15"), Some(ymd(2024, 1, 15)));
        assert_eq!(normalize_date(" 2024/01/15 "), Some(ymd(2024, 1, 15)));
        assert_eq!(normalize_date("2024-01-15 09:30:00"), Some(ymd(2024, 1, 15)));
        assert_eq!(normalize_date("2024-01-15T09:30:00"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_month_first_before_day_first() {
        // Ambiguous: read as March 4th
        assert_eq!(normalize_date("03/04/2024"), Some(ymd(2024, 3, 4)));
        // Only valid day-first
        assert_eq!(normalize_date("15/01/2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(normalize_date("15-01-2024"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_two_digit_years() {
        assert_eq!(normalize_date("01/15/24"), Some(ymd(2024, 1, 15)));
        assert_eq!(normalize_date("15/01/24"), Some(ymd(2024, 1, 15)));
        assert_eq!(normalize_date("15-01-24"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_blank_and_garbage() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("   "), None);
        assert_eq!(normalize_date("None"), None);
        assert_eq!(normalize_date("nan"), None);
        assert_eq!(normalize_date("next tuesday"), None);
        assert_eq!(normalize_date("2024-13-45"), None);
    }
}
