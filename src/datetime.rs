//! Flexible timestamp parsing shared by every component.
//!
//! Persisted records carry wall-clock timestamps as plain strings in one of
//! three legacy formats. Parsing tries each format in a fixed priority
//! order; the first one that parses wins. Callers get an `Option` back and
//! decide per record how to treat an unparsable value.

use chrono::{Local, NaiveDate, NaiveDateTime};

/// Full timestamp format used when writing new records.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Minute-precision format used for display-facing dates.
pub const MINUTE_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Bare date format (due dates, pickup dates).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current local wall-clock time. All persisted timestamps are local time.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Parse a timestamp in any of the three accepted formats.
pub fn parse_flexible(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    for fmt in [TIMESTAMP_FORMAT, MINUTE_FORMAT] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()?.and_hms_opt(0, 0, 0)
}

/// Parse a bare `YYYY-MM-DD` date, rejecting anything else.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Last second of the given calendar day.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 59, 59).expect("23:59:59 is a valid wall-clock time")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_all_three_formats_in_priority_order() {
        let full = parse_flexible("2025-03-14 09:26:53").unwrap();
        assert_eq!((full.hour(), full.minute(), full.second()), (9, 26, 53));

        let minute = parse_flexible("2025-03-14 09:26").unwrap();
        assert_eq!((minute.hour(), minute.minute(), minute.second()), (9, 26, 0));

        let day = parse_flexible("2025-03-14").unwrap();
        assert_eq!((day.hour(), day.minute(), day.second()), (0, 0, 0));
        assert_eq!((day.year(), day.month(), day.day()), (2025, 3, 14));
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        assert!(parse_flexible("  2025-01-02 10:00  ").is_some());
    }

    #[test]
    fn rejects_garbage_and_empty_input() {
        assert!(parse_flexible("").is_none());
        assert!(parse_flexible("   ").is_none());
        assert!(parse_flexible("not a date").is_none());
        assert!(parse_flexible("14/03/2025").is_none());
    }

    #[test]
    fn bare_date_parser_rejects_timestamps() {
        assert!(parse_date("2025-03-14").is_some());
        assert!(parse_date("2025-03-14 09:26").is_none());
    }

    #[test]
    fn end_of_day_is_one_second_before_midnight() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let eod = end_of_day(d);
        assert_eq!((eod.hour(), eod.minute(), eod.second()), (23, 59, 59));
    }
}
