//! Catalog-Crawler: a paced downloader for paginated catalog sites
//!
//! This crate walks a range of catalog index pages, extracts the items listed
//! on each page, and saves every item's cover image and detail page to disk.
//! Pages are processed strictly in order; items within a page are fanned out
//! to a bounded, paced worker pool.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for run-level (fatal) failures
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid arguments: {0}")]
    Argument(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to create directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid page transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PageStage,
        to: state::PageStage,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Errors from a single network retrieval
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Transport error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Fetch cancelled: {url}")]
    Cancelled { url: String },
}

impl FetchError {
    /// Returns true if the server answered with a non-2xx status
    pub fn is_http_status(&self) -> bool {
        matches!(self, Self::HttpStatus { .. })
    }

    /// Returns true for connection, DNS, timeout and body-read failures
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Errors from extracting items out of an index page
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Document is binary, not markup (NUL byte at offset {offset})")]
    Binary { offset: usize },

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// A failed write of a downloaded blob
#[derive(Debug, Error)]
#[error("Failed to write {}: {source}", path.display())]
pub struct PersistError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// Outcome error of fetching one URL into one file
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("Destination {} already claimed by another fetch in this run", path.display())]
    PathClaimed { path: PathBuf },

    #[error("Download task for {url} did not finish: {reason}")]
    TaskFailed { url: String, reason: String },
}

/// Result type alias for run-level operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use crate::config::Config;
pub use crate::crawler::{ItemRecord, PageRange};
pub use crate::output::CrawlReport;
pub use crate::state::PageStage;
pub use crate::url::slug_from_url;
