//! Calendar-date codec for the daily log archive.
//!
//! Maps inclusive date ranges to per-day file keys and extracts calendar
//! days from entry timestamps. All dates are plain calendar days with no
//! timezone attached, so daylight-saving boundaries cannot shift a day.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::FileKey;

/// All calendar days from `start` to `end`, inclusive, ascending.
/// Empty when `start > end`.
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// File keys for every day of an inclusive range.
pub fn keys_for_range(start: NaiveDate, end: NaiveDate) -> Vec<FileKey> {
    dates_between(start, end).map(FileKey::from_date).collect()
}

/// Strict `YYYY-MM-DD` parse for filter inputs. `None` on any other shape.
pub fn parse_date_input(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Calendar day of a timestamp string.
///
/// Looks for the first embedded `YYYY-MM-DD` pattern, then falls back to
/// generic datetime parsing. `None` means "unknown date": callers must
/// exclude such entries from date-range filters, never include them.
pub fn day_of(timestamp: &str) -> Option<NaiveDate> {
    if let Some(pattern) = find_date_pattern(timestamp) {
        if let Ok(d) = NaiveDate::parse_from_str(pattern, "%Y-%m-%d") {
            return Some(d);
        }
    }
    parse_datetime(timestamp).map(|dt| dt.date())
}

/// Clock-time portion (`HH:MM`) of a timestamp, for display.
pub fn time_of(timestamp: &str) -> Option<String> {
    if let Some(pos) = timestamp.find('T') {
        let rest = &timestamp[pos + 1..];
        let b = rest.as_bytes();
        if b.len() >= 5
            && b[0].is_ascii_digit()
            && b[1].is_ascii_digit()
            && b[2] == b':'
            && b[3].is_ascii_digit()
            && b[4].is_ascii_digit()
        {
            return Some(rest[..5].to_string());
        }
    }
    parse_datetime(timestamp).map(|dt| dt.format("%H:%M").to_string())
}

/// Inclusive range ending today and spanning `days` calendar days
/// (`days = 1` means today only). Backs the quick-range buttons.
pub fn quick_range(days: u32, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let back = days.saturating_sub(1);
    let start = today - chrono::Duration::days(i64::from(back));
    (start, today)
}

/// Full datetime parse used for sorting. Accepts RFC 3339 (with offset)
/// and the bare local shapes the recorder has emitted over time.
pub fn datetime_of(value: &str) -> Option<NaiveDateTime> {
    parse_datetime(value)
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    None
}

/// First `\d{4}-\d{2}-\d{2}` window in the string, if any.
fn find_date_pattern(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    if bytes.len() < 10 {
        return None;
    }
    for start in 0..=bytes.len() - 10 {
        let w = &bytes[start..start + 10];
        let matches = w.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
        if matches {
            return Some(&s[start..start + 10]);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn dates_between_inclusive_ascending() {
        let days: Vec<_> = dates_between(date(2024, 1, 30), date(2024, 2, 2)).collect();
        assert_eq!(
            days,
            vec![
                date(2024, 1, 30),
                date(2024, 1, 31),
                date(2024, 2, 1),
                date(2024, 2, 2),
            ]
        );
    }

    #[test]
    fn dates_between_counts_end_minus_start_plus_one() {
        let start = date(2023, 11, 1);
        let end = date(2024, 2, 1);
        let expected = (end - start).num_days() as usize + 1;
        assert_eq!(dates_between(start, end).count(), expected);
    }

    #[test]
    fn dates_between_empty_when_inverted() {
        assert_eq!(dates_between(date(2024, 2, 2), date(2024, 2, 1)).count(), 0);
    }

    #[test]
    fn keys_are_distinct_across_a_long_range() {
        // Injectivity: every day of a multi-year span maps to a unique key.
        let keys = keys_for_range(date(2023, 1, 1), date(2025, 12, 31));
        let unique: std::collections::BTreeSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
        for key in &keys {
            assert!(FileKey::parse(key.as_str()).is_some(), "bad key {}", key);
        }
    }

    #[test]
    fn parse_date_input_strict() {
        assert_eq!(parse_date_input("2024-01-05"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date_input("2024-1-5"), None);
        assert_eq!(parse_date_input("2024-01-05T10:00"), None);
        assert_eq!(parse_date_input("2024-13-05"), None);
    }

    #[test]
    fn day_of_prefers_embedded_pattern() {
        assert_eq!(day_of("2024-06-09T08:30:00+02:00"), Some(date(2024, 6, 9)));
        assert_eq!(day_of("logged at 2024-06-09 late"), Some(date(2024, 6, 9)));
        assert_eq!(day_of("June ninth"), None);
        assert_eq!(day_of(""), None);
    }

    #[test]
    fn time_of_extracts_clock() {
        assert_eq!(time_of("2024-06-09T08:30:00"), Some("08:30".to_string()));
        assert_eq!(time_of("2024-06-09 08:30:00"), Some("08:30".to_string()));
        assert_eq!(time_of("not a time"), None);
    }

    #[test]
    fn quick_range_today_is_single_day() {
        let today = date(2024, 5, 10);
        assert_eq!(quick_range(1, today), (today, today));
        assert_eq!(quick_range(7, today), (date(2024, 5, 4), today));
    }
}
