//! Entry filtering and ordering.
//!
//! Filters are applied over the currently loaded raw set; whether a
//! filter change also requires a reload is the session's call, not
//! this module's. Text matching is a case-insensitive substring test
//! against the description field only — a fixed projection, never the
//! full serialized record.

use chrono::{NaiveDate, NaiveDateTime};

use crate::date::{datetime_of, day_of};
use crate::models::LogEntry;

/// Current filter inputs: an inclusive date range and a free-text needle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub text: String,
}

impl FilterState {
    /// Identity of the active date range, used to decide whether a
    /// filter change needs new data. `None` unless both ends are set.
    pub fn range_key(&self) -> Option<String> {
        match (self.start, self.end) {
            (Some(s), Some(e)) => Some(format!("{}..{}", s, e)),
            _ => None,
        }
    }
}

/// Filter and sort the loaded set: matching entries only, newest first,
/// entries without a derivable timestamp after all dated ones (stable
/// among themselves).
pub fn apply(entries: &[LogEntry], filter: &FilterState) -> Vec<LogEntry> {
    let needle = filter.text.trim().to_lowercase();
    let mut out: Vec<LogEntry> = entries
        .iter()
        .filter(|e| in_date_range(e, filter.start, filter.end))
        .filter(|e| needle.is_empty() || e.description.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    sort_newest_first(&mut out);
    out
}

/// Descending by derived timestamp; undated entries last, stable.
pub fn sort_newest_first(entries: &mut [LogEntry]) {
    entries.sort_by(|a, b| match (sort_key(a), sort_key(b)) {
        (Some(ta), Some(tb)) => tb.cmp(&ta),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

fn sort_key(entry: &LogEntry) -> Option<NaiveDateTime> {
    let ts = entry.timestamp.as_deref()?;
    datetime_of(ts).or_else(|| day_of(ts).map(|d| d.and_hms_opt(0, 0, 0).unwrap()))
}

/// An entry is in range when its calendar day is derivable and inside
/// the inclusive bounds. With no bounds set, everything passes; with any
/// bound set, an underivable day never passes.
fn in_date_range(entry: &LogEntry, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    if start.is_none() && end.is_none() {
        return true;
    }
    let day = match entry.timestamp.as_deref().and_then(day_of) {
        Some(d) => d,
        None => return false,
    };
    if let Some(s) = start {
        if day < s {
            return false;
        }
    }
    if let Some(e) = end {
        if day > e {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ts: Option<&str>, desc: &str) -> LogEntry {
        serde_json::from_str(&match ts {
            Some(t) => format!(r#"{{"timestamp":"{}","description":"{}"}}"#, t, desc),
            None => format!(r#"{{"description":"{}"}}"#, desc),
        })
        .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn text_filter_is_case_insensitive() {
        let entries = vec![
            entry(None, "hit an error in the parser"),
            entry(None, "all good"),
        ];
        let filter = FilterState {
            text: "ERROR".to_string(),
            ..Default::default()
        };
        let out = apply(&entries, &filter);
        assert_eq!(out.len(), 1);
        assert!(out[0].description.contains("error"));
    }

    #[test]
    fn text_filter_matches_description_only() {
        let raw = r#"{"description":"plain","module":"deploy","related_files":["deploy.rs"]}"#;
        let entries = vec![serde_json::from_str(raw).unwrap()];
        let filter = FilterState {
            text: "deploy".to_string(),
            ..Default::default()
        };
        assert!(apply(&entries, &filter).is_empty());
    }

    #[test]
    fn date_range_is_inclusive_and_excludes_undated() {
        let entries = vec![
            entry(Some("2024-05-01T08:00:00"), "first"),
            entry(Some("2024-05-03T08:00:00"), "last"),
            entry(Some("2024-05-04T08:00:00"), "outside"),
            entry(None, "undated"),
        ];
        let filter = FilterState {
            start: Some(date(2024, 5, 1)),
            end: Some(date(2024, 5, 3)),
            text: String::new(),
        };
        let out = apply(&entries, &filter);
        let descs: Vec<&str> = out.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descs, vec!["last", "first"]);
    }

    #[test]
    fn no_bounds_passes_undated_entries() {
        let entries = vec![entry(None, "undated")];
        assert_eq!(apply(&entries, &FilterState::default()).len(), 1);
    }

    #[test]
    fn sort_is_newest_first_with_undated_last_and_stable() {
        let mut entries = vec![
            entry(None, "u1"),
            entry(Some("2024-05-01T08:00:00"), "older"),
            entry(None, "u2"),
            entry(Some("2024-05-02T08:00:00"), "newer"),
            entry(Some("2024-05-02"), "date-only"),
        ];
        sort_newest_first(&mut entries);
        let descs: Vec<&str> = entries.iter().map(|e| e.description.as_str()).collect();
        // Date-only parses as midnight, so it lands after the timed entry
        // of the same day; undated entries keep their relative order at
        // the tail.
        assert_eq!(descs, vec!["newer", "date-only", "older", "u1", "u2"]);
    }

    #[test]
    fn range_key_requires_both_bounds() {
        let mut filter = FilterState::default();
        assert_eq!(filter.range_key(), None);
        filter.start = Some(date(2024, 5, 1));
        assert_eq!(filter.range_key(), None);
        filter.end = Some(date(2024, 5, 3));
        assert_eq!(
            filter.range_key(),
            Some("2024-05-01..2024-05-03".to_string())
        );
    }
}
