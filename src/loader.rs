//! Batched day-file loading.
//!
//! Fetches a set of file keys against a resolved base in fixed-size
//! batches: all fetches within a batch run concurrently, batches run
//! strictly sequentially, so no more than one batch of requests is ever
//! in flight. Accumulation follows the original key order, never
//! completion order.
//!
//! A missing day (non-2xx) contributes nothing and is not an error. A
//! transport failure anywhere in a batch aborts the whole load — partial
//! data is never surfaced as if it were complete.

use futures::future::join_all;
use thiserror::Error;
use tracing::debug;

use crate::fetch::{join_url, Fetch, FetchError};
use crate::jsonl::parse_jsonl;
use crate::models::{FileKey, ParsedLine};
use crate::status::{StatusEvent, StatusSink};

/// Concurrent fetches per batch.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// A load aborted mid-flight; the accumulated result was discarded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("load aborted in batch {batch}: {source}")]
    Batch {
        batch: usize,
        #[source]
        source: FetchError,
    },
}

/// Fetch and parse every key, in batches, reporting progress after each
/// completed batch.
pub async fn load_files(
    fetcher: &dyn Fetch,
    base: &str,
    keys: &[FileKey],
    batch_size: usize,
    sink: &dyn StatusSink,
) -> Result<Vec<ParsedLine>, LoadError> {
    let batch_size = batch_size.max(1);
    let total = keys.len();
    let mut lines = Vec::new();

    for (batch_no, batch) in keys.chunks(batch_size).enumerate() {
        let urls: Vec<String> = batch
            .iter()
            .map(|key| join_url(base, key.as_str()))
            .collect();
        let results = join_all(urls.iter().map(|url| fetcher.get(url))).await;

        for (key, result) in batch.iter().zip(results) {
            match result {
                Ok(resp) if resp.is_success() => lines.extend(parse_jsonl(&resp.body)),
                Ok(resp) => {
                    // Absent day, not a failure.
                    debug!(key = %key, status = resp.status, "day file absent");
                }
                Err(source) => {
                    return Err(LoadError::Batch {
                        batch: batch_no,
                        source,
                    });
                }
            }
        }

        let done = (batch_no * batch_size + batch.len()).min(total);
        sink.report(StatusEvent::Loading { done, total });
    }

    Ok(lines)
}
