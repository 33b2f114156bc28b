//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the page loop that coordinates the whole run:
//! - Creating the output tree once, before any request
//! - Walking the page range strictly in order
//! - Fetching and extracting each index page
//! - Fanning items out to the paced pool and draining it before moving on
//! - Stopping cleanly when the run is cancelled

use crate::config::Config;
use crate::crawler::downloader::ItemDownloader;
use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::{build_http_client, FetchKind, Fetcher};
use crate::crawler::pool::ItemPool;
use crate::crawler::PageRange;
use crate::output::{CrawlReport, CrawlStatistics};
use crate::state::{PageOutcome, PageStage, PageTask};
use crate::storage::{FileStore, RunLayout};
use crate::url::index_page_url;
use crate::{CrawlError, DownloadError, FetchError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    range: PageRange,
    layout: Arc<RunLayout>,
    fetcher: Arc<Fetcher>,
    extractor: Extractor,
    downloader: Arc<ItemDownloader>,
    pool: ItemPool,
    stats: Arc<CrawlStatistics>,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Nothing touches the network or the filesystem yet.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `range` - Inclusive page range to crawl
    /// * `cancel` - Token that stops the run when cancelled
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlError)` - Invalid selectors, site URL, or HTTP client setup
    pub fn new(
        config: Config,
        range: PageRange,
        cancel: CancellationToken,
    ) -> Result<Self, CrawlError> {
        let extractor = Extractor::new(&config.selectors, &config.site.site_url)?;
        let client = build_http_client(&config.crawler, &config.user_agent)?;
        let fetcher = Arc::new(Fetcher::new(client, FileStore::new(), cancel.clone()));

        let layout = Arc::new(RunLayout::new(&config.output.base_dir, range));
        let stats = Arc::new(CrawlStatistics::new());
        let downloader = Arc::new(ItemDownloader::new(
            fetcher.clone(),
            layout.clone(),
            config.output.slug_strategy,
            stats.clone(),
        ));
        let pool = ItemPool::new(
            config.crawler.max_concurrent_items as usize,
            Duration::from_millis(config.crawler.launch_delay_ms),
            cancel.clone(),
        );

        Ok(Self {
            config: Arc::new(config),
            range,
            layout,
            fetcher,
            extractor,
            downloader,
            pool,
            stats,
            cancel,
        })
    }

    pub fn layout(&self) -> &RunLayout {
        &self.layout
    }

    /// Runs the crawl
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The range was walked (or the run was cancelled);
    ///   individual page and item failures are counted in the report
    /// * `Err(CrawlError)` - Setup failed before any request was made
    pub async fn run(&self) -> Result<CrawlReport, CrawlError> {
        let start_time = Instant::now();

        self.layout.create().await?;

        tracing::info!(
            "Crawling pages {}..={} into {}",
            self.range.start(),
            self.range.end(),
            self.layout.root().display()
        );

        for page in self.range.pages() {
            if self.cancel.is_cancelled() {
                self.stats.mark_cancelled();
                tracing::warn!("Run cancelled before page {}", page);
                break;
            }

            let outcome = self.process_page(page).await?;
            tracing::debug!("Page {} finished: {:?}", page, outcome);

            if outcome == PageOutcome::Cancelled {
                self.stats.mark_cancelled();
                tracing::warn!("Run cancelled during page {}", page);
                break;
            }
        }

        let report = self.stats.snapshot(start_time.elapsed());
        tracing::info!(
            "Done: {} index page(s), {} image(s), {} detail page(s) saved in {:?}",
            report.index_pages_saved,
            report.images_saved,
            report.detail_pages_saved,
            report.elapsed
        );

        Ok(report)
    }

    /// Walks one page through its stages
    ///
    /// Only an invalid stage transition is returned as an error; everything
    /// else ends the page with a logged [`PageOutcome`].
    async fn process_page(&self, page: u32) -> Result<PageOutcome, CrawlError> {
        let mut task = PageTask::new(
            page,
            index_page_url(&self.config.site.index_url_template, page),
            self.layout.index_path(page),
        );

        // FetchIndex
        tracing::info!("Downloading index page {}: {}", page, task.index_url);
        let fetched = match self
            .fetcher
            .fetch_to(FetchKind::IndexPage, &task.index_url, &task.index_path)
            .await
        {
            Ok(fetched) => {
                self.stats.record_index_saved();
                fetched
            }
            Err(DownloadError::Fetch(FetchError::Cancelled { .. })) => {
                task.abandon()?;
                return Ok(PageOutcome::Cancelled);
            }
            Err(e) => {
                tracing::error!("Index page {} failed: {}", page, e);
                self.stats.record_index_failed();
                task.abandon()?;
                return Ok(PageOutcome::IndexFailed);
            }
        };

        // ExtractItems
        task.advance(PageStage::ExtractItems)?;
        let items = match self.extractor.extract(&fetched.bytes) {
            Ok(items) => items,
            Err(e) => {
                tracing::error!(
                    "Failed to parse index page {} ({}): {}",
                    page,
                    task.index_path.display(),
                    e
                );
                self.stats.record_parse_failure();
                task.abandon()?;
                return Ok(PageOutcome::ParseFailed);
            }
        };

        if items.is_empty() {
            tracing::warn!(
                "Index page {} lists no items (empty page or past the end of the catalog)",
                page
            );
            self.stats.record_empty_page();
            task.abandon()?;
            return Ok(PageOutcome::Empty);
        }

        let count = items.len();
        self.stats.record_items_extracted(count);
        tracing::info!("Page {}: {} item(s)", page, count);

        // FanOutDownloads
        task.advance(PageStage::FanOutDownloads)?;
        let downloader = self.downloader.clone();
        let stats = self.stats.clone();
        let batch = self
            .pool
            .launch(items, move |item| {
                stats.record_item_launched();
                let downloader = downloader.clone();
                async move {
                    downloader.download(item).await;
                }
            })
            .await;
        tracing::debug!("Page {}: launched {} of {} item(s)", page, batch.launched(), count);

        // AwaitDrain
        task.advance(PageStage::AwaitDrain)?;
        let report = batch.drain().await;
        for _ in 0..report.panicked {
            self.stats.record_worker_panic();
        }

        task.advance(PageStage::Advance)?;

        if report.skipped > 0 || self.cancel.is_cancelled() {
            return Ok(PageOutcome::Cancelled);
        }
        Ok(PageOutcome::Downloaded { items: count })
    }
}

/// Runs the main crawl operation
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `range` - Inclusive page range
/// * `cancel` - Token that stops the run when cancelled
///
/// # Example
///
/// ```no_run
/// use catalog_crawler::config::Config;
/// use catalog_crawler::crawler::{run_crawl, PageRange};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let range = PageRange::new(1, 10)?;
/// let report = run_crawl(Config::default(), range, CancellationToken::new()).await?;
/// println!("{} files saved", report.files_saved());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    range: PageRange,
    cancel: CancellationToken,
) -> Result<CrawlReport, CrawlError> {
    let coordinator = Coordinator::new(config, range, cancel)?;
    coordinator.run().await
}
