//! Per-item download: cover image and detail page, side by side

use crate::config::SlugStrategy;
use crate::crawler::extractor::ItemRecord;
use crate::crawler::fetcher::{FetchKind, Fetched, Fetcher};
use crate::output::CrawlStatistics;
use crate::storage::RunLayout;
use crate::url::slug_for;
use crate::{DownloadError, FetchError};
use std::path::PathBuf;
use std::sync::Arc;

/// The two independent results of downloading one item
#[derive(Debug)]
pub struct ItemOutcome {
    pub image: Result<Fetched, DownloadError>,
    pub page: Result<Fetched, DownloadError>,
}

impl ItemOutcome {
    /// Returns true if both files were written
    pub fn is_complete(&self) -> bool {
        self.image.is_ok() && self.page.is_ok()
    }
}

/// Downloads one item's cover image into `images/` and its detail page into
/// `pages/`
///
/// The two fetches run as separate tasks. Whatever happens to one has no
/// effect on the other, and neither result is propagated as an error: both
/// are logged, counted, and handed back as an [`ItemOutcome`].
#[derive(Debug)]
pub struct ItemDownloader {
    fetcher: Arc<Fetcher>,
    layout: Arc<RunLayout>,
    slugs: SlugStrategy,
    stats: Arc<CrawlStatistics>,
}

impl ItemDownloader {
    pub fn new(
        fetcher: Arc<Fetcher>,
        layout: Arc<RunLayout>,
        slugs: SlugStrategy,
        stats: Arc<CrawlStatistics>,
    ) -> Self {
        Self {
            fetcher,
            layout,
            slugs,
            stats,
        }
    }

    pub async fn download(&self, item: ItemRecord) -> ItemOutcome {
        let image_path = self.layout.image_path(&slug_for(self.slugs, &item.image_url));
        let page_path = self.layout.page_path(&slug_for(self.slugs, &item.detail_url));

        tracing::debug!("Downloading item '{}' ({} tags)", item.title, item.tags.len());

        let image_task = self.spawn_fetch(FetchKind::Image, item.image_url.clone(), image_path);
        let page_task = self.spawn_fetch(FetchKind::DetailPage, item.detail_url.clone(), page_path);
        let (image, page) = tokio::join!(image_task, page_task);

        let image = flatten(image, &item.image_url);
        let page = flatten(page, &item.detail_url);

        self.report(FetchKind::Image, &item, &image);
        self.report(FetchKind::DetailPage, &item, &page);

        ItemOutcome { image, page }
    }

    fn spawn_fetch(
        &self,
        kind: FetchKind,
        url: String,
        path: PathBuf,
    ) -> tokio::task::JoinHandle<Result<Fetched, DownloadError>> {
        let fetcher = self.fetcher.clone();
        tokio::spawn(async move { fetcher.fetch_to(kind, &url, &path).await })
    }

    fn report(&self, kind: FetchKind, item: &ItemRecord, result: &Result<Fetched, DownloadError>) {
        match result {
            Ok(_) => match kind {
                FetchKind::Image => self.stats.record_image_saved(),
                _ => self.stats.record_detail_saved(),
            },
            Err(DownloadError::PathClaimed { path }) => {
                tracing::warn!(
                    "Skipping {} for '{}': {} is already taken by another item",
                    kind,
                    item.title,
                    path.display()
                );
                self.stats.record_path_collision();
            }
            Err(DownloadError::Fetch(FetchError::Cancelled { url })) => {
                tracing::debug!("Cancelled {} for '{}': {}", kind, item.title, url);
            }
            Err(e) => {
                tracing::error!("Download {} failed for '{}': {}", kind, item.title, e);
                match kind {
                    FetchKind::Image => self.stats.record_image_failed(),
                    _ => self.stats.record_detail_failed(),
                }
            }
        }
    }
}

fn flatten(
    joined: Result<Result<Fetched, DownloadError>, tokio::task::JoinError>,
    url: &str,
) -> Result<Fetched, DownloadError> {
    joined.unwrap_or_else(|e| {
        Err(DownloadError::TaskFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })
    })
}
