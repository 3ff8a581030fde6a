//! Directory-index discovery.
//!
//! Given an ordered list of candidate base URLs, work out which one is
//! actually serving the archive and which day files exist under it. No
//! listing API is assumed; discovery degrades through a fixed chain, each
//! step covering a different static-host configuration:
//!
//! 1. `index.json` manifest (`{"files": [...]}`), written by the archive's
//!    own indexing tool when present.
//! 2. Flat HTML listing with direct `YYYY/MM/DD.jsonl` anchors.
//! 3. Nested listing: year folders, then month folders, accumulating keys.
//! 4. Legacy flat-within-year: a year folder with no month subfolders
//!    contributes its direct file anchors as already-dated files.
//!
//! The order is load-bearing — do not reorder or merge the steps.

use serde::Deserialize;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

use crate::fetch::{join_url, Fetch};
use crate::listing::{dir_token, extract_hrefs, normalize_href};
use crate::models::FileKey;

/// Resolved archive root and the flat set of reachable day files.
#[derive(Debug, Clone)]
pub struct DirectoryIndex {
    pub base: String,
    pub files: BTreeSet<FileKey>,
}

/// Discovery could not produce a usable listing from any candidate base.
/// Callers degrade to probe mode rather than aborting.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("no candidate base served a usable listing")]
    NoListing,
}

#[derive(Deserialize)]
struct Manifest {
    files: Vec<String>,
}

/// Try each candidate base in order and build the file index from the
/// first that yields anything. See the module docs for the fallback chain.
pub async fn resolve(fetcher: &dyn Fetch, bases: &[String]) -> Result<DirectoryIndex, DiscoveryError> {
    for base in bases {
        if let Some(index) = try_manifest(fetcher, base).await {
            return Ok(index);
        }
        match try_listing(fetcher, base).await {
            Some(index) => return Ok(index),
            None => debug!(base = %base, "no usable listing at base"),
        }
    }
    Err(DiscoveryError::NoListing)
}

/// When no directory index could be resolved at all, find out which base
/// is reachable by fetching one known key against each candidate. Success
/// *and* 404 both count as reachable; only transport failures disqualify.
/// Falls back to the last candidate when nothing answers.
pub async fn probe_base(fetcher: &dyn Fetch, bases: &[String], sample: &FileKey) -> String {
    for base in bases {
        let url = join_url(base, sample.as_str());
        match fetcher.get(&url).await {
            Ok(resp) if resp.is_success() || resp.status == 404 => return base.clone(),
            Ok(resp) => debug!(base = %base, status = resp.status, "probe got unexpected status"),
            Err(e) => debug!(base = %base, error = %e, "probe transport failure"),
        }
    }
    bases.last().cloned().unwrap_or_default()
}

/// Fast path: an `index.json` manifest at the base root.
async fn try_manifest(fetcher: &dyn Fetch, base: &str) -> Option<DirectoryIndex> {
    let url = join_url(base, "index.json");
    let resp = fetcher.get(&url).await.ok()?;
    if !resp.is_success() {
        return None;
    }
    let manifest: Manifest = serde_json::from_str(&resp.body).ok()?;
    let files: BTreeSet<FileKey> = manifest
        .files
        .iter()
        .filter_map(|f| FileKey::parse(&normalize_href(f)))
        .collect();
    if files.is_empty() {
        return None;
    }
    debug!(base, count = files.len(), "resolved index from manifest");
    Some(DirectoryIndex {
        base: base.to_string(),
        files,
    })
}

/// HTML listing walk: flat, then nested year/month, then legacy.
async fn try_listing(fetcher: &dyn Fetch, base: &str) -> Option<DirectoryIndex> {
    let resp = fetcher.get(base).await.ok()?;
    if !resp.is_success() {
        return None;
    }

    let items: Vec<String> = extract_hrefs(&resp.body)
        .iter()
        .map(|h| normalize_href(h))
        .filter(|h| !h.is_empty())
        .collect();

    // Flat listing: direct file anchors. Entries shallower than three
    // segments are navigation links, not day files.
    let direct: BTreeSet<FileKey> = items
        .iter()
        .filter(|h| h.ends_with(".jsonl"))
        .filter(|h| h.split('/').count() >= 3)
        .filter_map(|h| FileKey::parse(h))
        .collect();
    if !direct.is_empty() {
        debug!(base, count = direct.len(), "resolved index from flat listing");
        return Some(DirectoryIndex {
            base: base.to_string(),
            files: direct,
        });
    }

    // Nested listing: recurse one level into each year, then each month.
    let year_dirs: Vec<String> = items.iter().filter_map(|h| dir_token(h, 4)).collect();
    if year_dirs.is_empty() {
        return None;
    }

    let mut files = BTreeSet::new();
    for year in &year_dirs {
        let year_resp = match fetcher.get(&join_url(base, year)).await {
            Ok(r) if r.is_success() => r,
            _ => continue,
        };
        let year_items: Vec<String> = extract_hrefs(&year_resp.body)
            .iter()
            .map(|h| normalize_href(h))
            .filter(|h| !h.is_empty())
            .collect();

        let month_dirs: Vec<String> = year_items
            .iter()
            .filter_map(|h| {
                let mut value = h.as_str();
                if let Some(rest) = value.strip_prefix(year.as_str()) {
                    value = rest;
                }
                let value = value.strip_prefix('/').unwrap_or(value);
                dir_token(value, 2)
            })
            .collect();

        if month_dirs.is_empty() {
            // Legacy flat-within-year layout.
            for item in year_items.iter().filter(|h| h.ends_with(".jsonl")) {
                let rest = item.strip_prefix(year.as_str()).unwrap_or(item);
                let candidate = format!("{}{}", year, rest);
                if let Some(key) = FileKey::parse(&candidate) {
                    files.insert(key);
                }
            }
            continue;
        }

        for month in &month_dirs {
            let month_url = join_url(base, &format!("{}{}", year, month));
            let month_resp = match fetcher.get(&month_url).await {
                Ok(r) if r.is_success() => r,
                _ => continue,
            };
            for item in extract_hrefs(&month_resp.body)
                .iter()
                .map(|h| normalize_href(h))
                .filter(|h| h.ends_with(".jsonl"))
            {
                let name = item.rsplit('/').next().unwrap_or(&item);
                let candidate = format!("{}{}{}", year, month, name);
                if let Some(key) = FileKey::parse(&candidate) {
                    files.insert(key);
                }
            }
        }
    }

    if files.is_empty() {
        return None;
    }
    debug!(base, count = files.len(), "resolved index from nested listing");
    Some(DirectoryIndex {
        base: base.to_string(),
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testutil::MapFetcher;

    const BASE: &str = "http://host/lifelog/";

    fn keys(index: &DirectoryIndex) -> Vec<&str> {
        index.files.iter().map(|k| k.as_str()).collect()
    }

    #[tokio::test]
    async fn manifest_short_circuits_listing_walk() {
        let fetcher = MapFetcher::new().page(
            "http://host/lifelog/index.json",
            r#"{"files":["2024/01/02.jsonl","2024/01/03.jsonl"]}"#,
        );
        let index = resolve(&fetcher, &[BASE.to_string()]).await.unwrap();
        assert_eq!(index.base, BASE);
        assert_eq!(keys(&index), vec!["2024/01/02.jsonl", "2024/01/03.jsonl"]);
        // index.json only; the listing page was never requested.
        assert_eq!(fetcher.request_count(), 1);
    }

    #[tokio::test]
    async fn flat_listing_keeps_deep_entries_only() {
        let html = r#"
            <a href="../">Parent</a>
            <a href="/workspace/lifelog/2024/01/02.jsonl">02</a>
            <a href="stray.jsonl">stray</a>
        "#;
        let fetcher = MapFetcher::new().page(BASE, html);
        let index = resolve(&fetcher, &[BASE.to_string()]).await.unwrap();
        assert_eq!(keys(&index), vec!["2024/01/02.jsonl"]);
    }

    #[tokio::test]
    async fn nested_listing_with_legacy_year_fallback() {
        // 2024 has month folders; 2025 lists day files directly.
        let fetcher = MapFetcher::new()
            .page(BASE, r#"<a href="2024/">y</a><a href="2025/">y</a>"#)
            .page(
                "http://host/lifelog/2024/",
                r#"<a href="2024/01/">m</a><a href="2024/02/">m</a>"#,
            )
            .page(
                "http://host/lifelog/2024/01/",
                r#"<a href="2024/01/05.jsonl">d</a>"#,
            )
            .page(
                "http://host/lifelog/2024/02/",
                r#"<a href="11.jsonl">d</a>"#,
            )
            .page(
                "http://host/lifelog/2025/",
                r#"<a href="2025/03/15.jsonl">d</a>"#,
            );
        let index = resolve(&fetcher, &[BASE.to_string()]).await.unwrap();
        assert_eq!(
            keys(&index),
            vec!["2024/01/05.jsonl", "2024/02/11.jsonl", "2025/03/15.jsonl"]
        );
    }

    #[tokio::test]
    async fn second_base_wins_when_first_is_unreachable() {
        let other = "http://alt/lifelog/";
        let fetcher = MapFetcher::new()
            .unreachable("http://host/")
            .page(other, r#"<a href="2024/01/02.jsonl">d</a>"#);
        let index = resolve(&fetcher, &[BASE.to_string(), other.to_string()])
            .await
            .unwrap();
        assert_eq!(index.base, other);
    }

    #[tokio::test]
    async fn no_listing_anywhere_is_a_discovery_error() {
        let fetcher = MapFetcher::new().page(BASE, "<html><body>welcome</body></html>");
        let err = resolve(&fetcher, &[BASE.to_string()]).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::NoListing));
    }

    #[tokio::test]
    async fn probe_accepts_404_as_reachable() {
        let sample = FileKey::parse("2024/01/02.jsonl").unwrap();
        let fetcher = MapFetcher::new().unreachable("http://host/");
        let alt = "http://alt/lifelog/".to_string();
        // alt serves nothing, so the sample key 404s — still reachable.
        let base = probe_base(&fetcher, &[BASE.to_string(), alt.clone()], &sample).await;
        assert_eq!(base, alt);
    }

    #[tokio::test]
    async fn probe_falls_back_to_last_candidate() {
        let sample = FileKey::parse("2024/01/02.jsonl").unwrap();
        let fetcher = MapFetcher::new()
            .unreachable("http://host/")
            .unreachable("http://alt/");
        let alt = "http://alt/lifelog/".to_string();
        let base = probe_base(&fetcher, &[BASE.to_string(), alt.clone()], &sample).await;
        assert_eq!(base, alt);
    }
}
