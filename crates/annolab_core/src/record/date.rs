//! Calendar-date detection for string leaves.
//!
//! A string is date-typed only when it matches `YYYY-MM-DD` lexically and
//! names a real calendar day. `2024-99-99` stays a plain string.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

const DATE_FORMAT: &str = "%Y-%m-%d";

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

/// Parses `value` as a calendar date when it is strictly date-shaped.
pub fn parse_date_like(value: &str) -> Option<NaiveDate> {
    if !DATE_PATTERN.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Returns whether `value` would be stored as a date-typed leaf.
pub fn is_date_like(value: &str) -> bool {
    parse_date_like(value).is_some()
}

/// Formats a date back to its canonical `YYYY-MM-DD` form.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_date, is_date_like, parse_date_like};
    use chrono::NaiveDate;

    #[test]
    fn accepts_real_calendar_dates() {
        assert_eq!(
            parse_date_like("2024-01-15"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert!(is_date_like("2024-02-29"));
    }

    #[test]
    fn rejects_shape_matches_that_are_not_dates() {
        assert!(!is_date_like("2024-99-99"));
        assert!(!is_date_like("2023-02-29"));
    }

    #[test]
    fn rejects_loose_formats() {
        assert!(!is_date_like("2024-1-15"));
        assert!(!is_date_like("2024-01-15T00:00:00Z"));
        assert!(!is_date_like(" 2024-01-15"));
        assert!(!is_date_like("2024/01/15"));
    }

    #[test]
    fn format_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_date(date), "2024-03-07");
    }
}
