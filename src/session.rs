//! Session-scoped load orchestration.
//!
//! One [`Session`] owns every piece of state the pipeline shares: the
//! resolved directory index, the reachable base, the raw loaded set, and
//! the identity of the load that produced it. There are no module-level
//! caches; dropping the session (or calling [`Session::invalidate`])
//! forgets everything.
//!
//! A filter change asks [`Session::ensure_loaded`] for data. The session
//! distinguishes "this filter needs new data" (the active date range
//! differs from the one that produced the current raw set) from "this
//! filter only narrows what's loaded" and hits the network only for the
//! former.
//!
//! Loads are tagged with a generation counter. A load that was superseded
//! before committing is discarded instead of clobbering newer state, so
//! an abandoned in-flight load can never win over the one that replaced
//! it.

use chrono::NaiveDate;
use tracing::debug;

use crate::date::keys_for_range;
use crate::fetch::Fetch;
use crate::filter::{apply, FilterState};
use crate::jsonl::entries_only;
use crate::loader::{load_files, LoadError};
use crate::models::{FileKey, LogEntry, ParsedLine};
use crate::resolver::{probe_base, resolve, DirectoryIndex};
use crate::status::{StatusEvent, StatusSink};

/// What produced the current raw set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// Every file the directory index listed.
    Listing,
    /// The files of one inclusive date range, keyed `start..end`.
    Range(String),
}

pub struct Session {
    fetcher: Box<dyn Fetch>,
    sink: Box<dyn StatusSink>,
    bases: Vec<String>,
    batch_size: usize,

    index: Option<DirectoryIndex>,
    base: Option<String>,
    raw: Vec<ParsedLine>,
    source: Option<LoadSource>,
    generation: u64,
}

impl Session {
    pub fn new(
        fetcher: Box<dyn Fetch>,
        sink: Box<dyn StatusSink>,
        bases: Vec<String>,
        batch_size: usize,
    ) -> Self {
        Self {
            fetcher,
            sink,
            bases,
            batch_size,
            index: None,
            base: None,
            raw: Vec::new(),
            source: None,
            generation: 0,
        }
    }

    /// Drop every cache: index, base, raw set, and load identity. The
    /// next `ensure_loaded` starts from scratch.
    pub fn invalidate(&mut self) {
        self.index = None;
        self.base = None;
        self.raw.clear();
        self.source = None;
        self.generation += 1;
    }

    /// Raw line count of the current set, malformed sentinels included.
    pub fn raw_count(&self) -> usize {
        self.raw.len()
    }

    /// Count of lines that failed to parse.
    pub fn malformed_count(&self) -> usize {
        self.raw
            .iter()
            .filter(|l| matches!(l, ParsedLine::Malformed { .. }))
            .count()
    }

    /// Well-formed entries of the current raw set.
    pub fn entries(&self) -> Vec<LogEntry> {
        entries_only(self.raw.clone())
    }

    /// Filtered, sorted view of the current raw set.
    pub fn filtered(&self, filter: &FilterState) -> Vec<LogEntry> {
        apply(&self.entries(), filter)
    }

    /// Make sure the raw set matches the filter's data needs, reloading
    /// only when the active date range differs from the one that loaded
    /// the current set.
    pub async fn ensure_loaded(&mut self, filter: &FilterState) -> Result<(), LoadError> {
        if let (Some(start), Some(end)) = (filter.start, filter.end) {
            let key = format!("{}..{}", start, end);
            if self.source.as_ref() != Some(&LoadSource::Range(key.clone())) {
                return self.load_range(start, end, key).await;
            }
            return Ok(());
        }
        if self.raw.is_empty() || self.source != Some(LoadSource::Listing) {
            return self.load_all().await;
        }
        Ok(())
    }

    /// Load every file the directory index lists. On discovery failure
    /// the session degrades: the raw set empties and the caller is told
    /// to narrow by date range (probe mode handles that path).
    pub async fn load_all(&mut self) -> Result<(), LoadError> {
        let generation = self.begin_load();
        let index = match self.file_index().await {
            Some(index) => index,
            None => {
                self.commit(generation, Vec::new(), None);
                self.sink.report(StatusEvent::DiscoveryDegraded);
                return Ok(());
            }
        };
        let keys: Vec<FileKey> = index.files.iter().cloned().collect();
        self.load_keys(generation, keys, &index.base, LoadSource::Listing)
            .await
    }

    /// Load the files of one inclusive date range. Uses the directory
    /// index to skip days with no file when an index is available;
    /// otherwise probes for a reachable base and fetches every day key,
    /// letting absent days 404 harmlessly.
    pub async fn load_range(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        key: String,
    ) -> Result<(), LoadError> {
        let generation = self.begin_load();
        let all_keys = keys_for_range(start, end);
        if all_keys.is_empty() {
            self.commit(generation, Vec::new(), Some(LoadSource::Range(key)));
            self.sink.report(StatusEvent::NoFiles);
            return Ok(());
        }

        let (keys, base) = match self.file_index().await {
            Some(index) => {
                let keys: Vec<FileKey> = all_keys
                    .into_iter()
                    .filter(|k| index.files.contains(k))
                    .collect();
                (keys, index.base)
            }
            None => {
                let base = match &self.base {
                    Some(base) => base.clone(),
                    None => {
                        let probed =
                            probe_base(self.fetcher.as_ref(), &self.bases, &all_keys[0]).await;
                        self.base = Some(probed.clone());
                        probed
                    }
                };
                (all_keys, base)
            }
        };

        self.load_keys(generation, keys, &base, LoadSource::Range(key))
            .await
    }

    async fn load_keys(
        &mut self,
        generation: u64,
        keys: Vec<FileKey>,
        base: &str,
        source: LoadSource,
    ) -> Result<(), LoadError> {
        if keys.is_empty() {
            self.commit(generation, Vec::new(), Some(source));
            self.sink.report(StatusEvent::NoFiles);
            return Ok(());
        }
        match load_files(
            self.fetcher.as_ref(),
            base,
            &keys,
            self.batch_size,
            self.sink.as_ref(),
        )
        .await
        {
            Ok(lines) => {
                let count = lines.len();
                if self.commit(generation, lines, Some(source)) {
                    self.sink.report(StatusEvent::Loaded { entries: count });
                }
                Ok(())
            }
            Err(e) => {
                // Discard the partial accumulation wholesale.
                self.commit(generation, Vec::new(), None);
                self.sink.report(StatusEvent::LoadFailed);
                Err(e)
            }
        }
    }

    /// Resolve the directory index once per session; later calls return
    /// the cache without touching the network. A failed resolution is
    /// not cached, so a later call may retry.
    async fn file_index(&mut self) -> Option<DirectoryIndex> {
        if self.index.is_none() {
            match resolve(self.fetcher.as_ref(), &self.bases).await {
                Ok(index) => {
                    self.base = Some(index.base.clone());
                    self.index = Some(index);
                }
                Err(e) => debug!(error = %e, "directory index unavailable"),
            }
        }
        self.index.clone()
    }

    fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Install a load's result unless a newer load has begun since.
    /// Returns whether the result was accepted.
    fn commit(&mut self, generation: u64, raw: Vec<ParsedLine>, source: Option<LoadSource>) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "stale load discarded");
            return false;
        }
        self.raw = raw;
        self.source = source;
        true
    }
}
