//! Crawler module for catalog page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Index page extraction into item records
//! - HTTP fetching and persisting of pages and images
//! - Per-item downloads of cover image and detail page
//! - The bounded, paced worker pool
//! - Overall crawl coordination

mod coordinator;
mod downloader;
mod extractor;
mod fetcher;
mod pool;

pub use coordinator::{run_crawl, Coordinator};
pub use downloader::{ItemDownloader, ItemOutcome};
pub use extractor::{Extractor, ItemRecord};
pub use fetcher::{build_http_client, FetchKind, Fetched, Fetcher};
pub use pool::{ItemPool, LaunchedBatch, PoolReport};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::CrawlError;
use std::ops::RangeInclusive;
use tokio_util::sync::CancellationToken;

/// Inclusive range of index page numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    start: u32,
    end: u32,
}

impl PageRange {
    /// Creates a range, rejecting `start > end`
    pub fn new(start: u32, end: u32) -> Result<Self, CrawlError> {
        if start > end {
            return Err(CrawlError::Argument(format!(
                "start page {} is after end page {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Page numbers in increasing order
    pub fn pages(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    /// Number of pages in the range
    pub fn len(&self) -> u64 {
        u64::from(self.end - self.start) + 1
    }

    /// A range always holds at least one page
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Create the `<base>/<start>-<end>` output tree
/// 2. Build the HTTP client
/// 3. Fetch and extract each index page in order
/// 4. Download every item's image and detail page through the paced pool
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished; failures are counted, not raised
/// * `Err(CrawlError)` - Setup failed
pub async fn crawl(
    config: Config,
    range: PageRange,
    cancel: CancellationToken,
) -> Result<CrawlReport, CrawlError> {
    run_crawl(config, range, cancel).await
}
