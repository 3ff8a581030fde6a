//! HTTP seam.
//!
//! All remote reads go through the [`Fetch`] trait so the discovery and
//! loading pipeline can run against an in-memory archive in tests. The
//! trait deliberately separates the two ways a GET can go wrong: a
//! transport failure (DNS, refused connection, timeout) is an error, while
//! a non-2xx response is an ordinary [`FetchResponse`] — probe mode treats
//! a 404 as proof that a base is reachable.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// A completed HTTP response, successful or not.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure to complete a request at all.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport failure fetching {url}: {message}")]
    Transport { url: String, message: String },
}

/// Minimal GET-only client abstraction.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// Production implementation backed by reqwest.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client with a per-request timeout.
    pub fn new(timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(FetchResponse { status, body })
    }
}

/// Join a base URL and a relative path without doubling slashes.
pub fn join_url(base: &str, path: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}
