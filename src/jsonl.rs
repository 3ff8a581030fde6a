//! Newline-delimited JSON parsing.
//!
//! Each line of a day file is an independent JSON object. Blank lines
//! (including trailing ones) are skipped; a line that fails to parse is
//! kept as a [`ParsedLine::Malformed`] sentinel so the raw load count
//! stays honest while rendering excludes it.

use crate::models::{LogEntry, ParsedLine};

/// Parse one file's text into lines. Never fails.
pub fn parse_jsonl(text: &str) -> Vec<ParsedLine> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match serde_json::from_str::<LogEntry>(line) {
            Ok(entry) => ParsedLine::Entry(entry),
            Err(_) => ParsedLine::Malformed {
                raw: line.to_string(),
            },
        })
        .collect()
}

/// Keep only well-formed entries, dropping malformed sentinels.
pub fn entries_only(lines: Vec<ParsedLine>) -> Vec<LogEntry> {
    lines
        .into_iter()
        .filter_map(|line| match line {
            ParsedLine::Entry(e) => Some(e),
            ParsedLine::Malformed { .. } => None,
        })
        .collect()
}
