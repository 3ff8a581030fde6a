//! Core data models used throughout Lifelog Harness.
//!
//! These types represent the log entries and file keys that flow through
//! the discovery, loading, and rendering pipeline.

use chrono::NaiveDate;
use serde::Deserialize;

/// One logged life/work event, parsed from a single JSONL line.
///
/// Fields the recorder never wrote deserialize to their documented
/// defaults: a missing `status` means `completed`, a missing `module`
/// means `work`. Unknown JSON fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub module: Module,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub related_files: Vec<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub skill_name: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Module a log entry belongs to.
///
/// Values outside the known vocabulary are preserved verbatim in
/// [`Module::Unknown`] rather than aliased to a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Module {
    Work,
    News,
    Unknown(String),
}

impl Default for Module {
    fn default() -> Self {
        Module::Work
    }
}

impl From<String> for Module {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "work" => Module::Work,
            "news" => Module::News,
            _ => Module::Unknown(s),
        }
    }
}

impl Module {
    /// Label used for display output.
    pub fn as_str(&self) -> &str {
        match self {
            Module::Work => "work",
            Module::News => "news",
            Module::Unknown(s) => s.as_str(),
        }
    }
}

/// Completion status of a log entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Status {
    Pending,
    Completed,
    Failed,
    Unknown(String),
}

impl Default for Status {
    fn default() -> Self {
        Status::Completed
    }
}

impl From<String> for Status {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "pending" => Status::Pending,
            "completed" => Status::Completed,
            "failed" => Status::Failed,
            _ => Status::Unknown(s),
        }
    }
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Pending => "pending",
            Status::Completed => "completed",
            Status::Failed => "failed",
            Status::Unknown(s) => s.as_str(),
        }
    }
}

/// One line of a JSONL file after parsing.
///
/// A line that is not valid JSON becomes [`ParsedLine::Malformed`]; it is
/// counted in raw load totals but never rendered and never an error.
#[derive(Debug, Clone)]
pub enum ParsedLine {
    Entry(LogEntry),
    Malformed { raw: String },
}

/// Relative path of one day's log file: `YYYY/MM/DD.jsonl`.
///
/// Separators are always `/` and the suffix appears exactly once.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileKey(String);

impl FileKey {
    /// Derive the key for a calendar date, zero-padded.
    pub fn from_date(date: NaiveDate) -> Self {
        FileKey(date.format("%Y/%m/%d.jsonl").to_string())
    }

    /// Accept an already-normalized relative path from a directory index.
    /// Returns `None` unless it has the `YYYY/MM/DD.jsonl` shape.
    pub fn parse(path: &str) -> Option<Self> {
        let rest = path.strip_suffix(".jsonl")?;
        let mut parts = rest.split('/');
        let (y, m, d) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        let all_digits = |s: &str, n: usize| s.len() == n && s.bytes().all(|b| b.is_ascii_digit());
        if all_digits(y, 4) && all_digits(m, 2) && all_digits(d, 2) {
            Some(FileKey(path.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
