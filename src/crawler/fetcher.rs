//! HTTP fetcher implementation
//!
//! This module handles every network retrieval the crawler makes:
//! - Building the HTTP client with the configured user agent and deadlines
//! - GET requests with the body fully buffered
//! - Error classification (transport vs. HTTP status)
//! - Handing the buffer to the file store under a claimed destination path
//!
//! There is no retry logic; a failed fetch is reported once and left alone.

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::storage::FileStore;
use crate::{DownloadError, FetchError};
use bytes::Bytes;
use reqwest::Client;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What is being fetched; only affects logging and counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    IndexPage,
    DetailPage,
    Image,
}

impl FetchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IndexPage => "index page",
            Self::DetailPage => "detail page",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful fetch that is now on disk
#[derive(Debug, Clone)]
pub struct Fetched {
    pub url: String,
    pub path: PathBuf,
    pub bytes: Bytes,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `crawler` - Deadlines for connect and the whole request
/// * `user_agent` - The user agent identification
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retrieves URLs and persists them through the file store
///
/// Shared by the coordinator and every item downloader.
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    store: FileStore,
    cancel: CancellationToken,
}

impl Fetcher {
    pub fn new(client: Client, store: FileStore, cancel: CancellationToken) -> Self {
        Self {
            client,
            store,
            cancel,
        }
    }

    /// Fetches a URL into memory
    ///
    /// # Error Classification
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | URL does not parse | `InvalidUrl` |
    /// | Connection refused, DNS, TLS, timeout, body read | `Transport` |
    /// | Any non-2xx status | `HttpStatus` |
    /// | Run cancelled while in flight | `Cancelled` |
    pub async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(FetchError::Cancelled {
                url: url.to_string(),
            }),
            result = self.get(parsed) => result,
        }
    }

    async fn get(&self, url: Url) -> Result<Bytes, FetchError> {
        let url_str = url.to_string();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url_str.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url_str,
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url_str,
                source,
            })
    }

    /// Fetches `url` and writes it to `path`
    ///
    /// The path is claimed before the request goes out; a second fetch aimed
    /// at the same path in this run fails with `PathClaimed` without touching
    /// the network or the file.
    pub async fn fetch_to(
        &self,
        kind: FetchKind,
        url: &str,
        path: &Path,
    ) -> Result<Fetched, DownloadError> {
        if !self.store.claim(path) {
            return Err(DownloadError::PathClaimed {
                path: path.to_path_buf(),
            });
        }

        tracing::debug!("Fetching {} {}", kind, url);
        let bytes = self.fetch(url).await?;
        self.store.persist(path, &bytes).await?;
        tracing::debug!(
            "Saved {} {} -> {} ({} bytes)",
            kind,
            url,
            path.display(),
            bytes.len()
        );

        Ok(Fetched {
            url: url.to_string(),
            path: path.to_path_buf(),
            bytes,
        })
    }
}
