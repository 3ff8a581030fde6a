//! Load status reporting.
//!
//! Every load ends in a defined, described state, even when every remote
//! call fails. Status is emitted on **stderr** so stdout stays parseable
//! for scripts.

use std::io::Write;

/// A single status event from the discovery/load pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusEvent {
    /// A batch completed: `done` of `total` files fetched so far.
    Loading { done: usize, total: usize },
    /// A load finished; `entries` counts every parsed line, malformed
    /// sentinels included.
    Loaded { entries: usize },
    /// The resolved index or requested range produced no files.
    NoFiles,
    /// Discovery failed; the session degraded to range-driven probe mode.
    DiscoveryDegraded,
    /// A batch aborted and the in-progress accumulation was discarded.
    LoadFailed,
}

/// Receives status events. Implementations write to stderr (human or JSON).
pub trait StatusSink: Send + Sync {
    fn report(&self, event: StatusEvent);
}

/// Human-friendly status on stderr: "Loading... 40/125".
pub struct StderrStatus;

impl StatusSink for StderrStatus {
    fn report(&self, event: StatusEvent) {
        let line = match &event {
            StatusEvent::Loading { done, total } => {
                format!("Loading... {}/{}\n", done, total)
            }
            StatusEvent::Loaded { entries } => {
                format!("Loaded lifelog: {} entries\n", entries)
            }
            StatusEvent::NoFiles => "No lifelog files found.\n".to_string(),
            StatusEvent::DiscoveryDegraded => {
                "Cannot list lifelog files. Use date range to load.\n".to_string()
            }
            StatusEvent::LoadFailed => "Failed to load lifelog.\n".to_string(),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable status: one JSON object per line on stderr.
pub struct JsonStatus;

impl StatusSink for JsonStatus {
    fn report(&self, event: StatusEvent) {
        let obj = match &event {
            StatusEvent::Loading { done, total } => serde_json::json!({
                "event": "loading",
                "done": done,
                "total": total
            }),
            StatusEvent::Loaded { entries } => serde_json::json!({
                "event": "loaded",
                "entries": entries
            }),
            StatusEvent::NoFiles => serde_json::json!({ "event": "no_files" }),
            StatusEvent::DiscoveryDegraded => serde_json::json!({ "event": "discovery_degraded" }),
            StatusEvent::LoadFailed => serde_json::json!({ "event": "load_failed" }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op sink when status output is disabled.
pub struct NoStatus;

impl StatusSink for NoStatus {
    fn report(&self, _event: StatusEvent) {}
}

/// Status mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusMode {
    Off,
    Human,
    Json,
}

impl StatusMode {
    /// Default: human status when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            StatusMode::Human
        } else {
            StatusMode::Off
        }
    }

    /// Build a sink for this mode. Caller passes it to the session.
    pub fn sink(&self) -> Box<dyn StatusSink> {
        match self {
            StatusMode::Off => Box::new(NoStatus),
            StatusMode::Human => Box::new(StderrStatus),
            StatusMode::Json => Box::new(JsonStatus),
        }
    }
}
