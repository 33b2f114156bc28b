//! Run statistics
//!
//! Every fetch outcome is reduced to a log line and one of these counters.
//! Workers update them concurrently; the coordinator takes a snapshot at the
//! end of the run.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Live counters shared by the coordinator and every item downloader
#[derive(Debug, Default)]
pub struct CrawlStatistics {
    index_pages_saved: AtomicU64,
    index_pages_failed: AtomicU64,
    parse_failures: AtomicU64,
    empty_pages: AtomicU64,
    items_extracted: AtomicU64,
    items_launched: AtomicU64,
    images_saved: AtomicU64,
    images_failed: AtomicU64,
    detail_pages_saved: AtomicU64,
    detail_pages_failed: AtomicU64,
    path_collisions: AtomicU64,
    worker_panics: AtomicU64,
    cancelled: AtomicBool,
}

macro_rules! counter {
    ($($incr:ident => $field:ident),* $(,)?) => {
        $(
            pub fn $incr(&self) {
                self.$field.fetch_add(1, Ordering::Relaxed);
            }
        )*
    };
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    counter! {
        record_index_saved => index_pages_saved,
        record_index_failed => index_pages_failed,
        record_parse_failure => parse_failures,
        record_empty_page => empty_pages,
        record_item_launched => items_launched,
        record_image_saved => images_saved,
        record_image_failed => images_failed,
        record_detail_saved => detail_pages_saved,
        record_detail_failed => detail_pages_failed,
        record_path_collision => path_collisions,
        record_worker_panic => worker_panics,
    }

    pub fn record_items_extracted(&self, count: usize) {
        self.items_extracted
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn mark_cancelled(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Copies the current counter values into a plain report
    pub fn snapshot(&self, elapsed: Duration) -> CrawlReport {
        CrawlReport {
            index_pages_saved: self.index_pages_saved.load(Ordering::Relaxed),
            index_pages_failed: self.index_pages_failed.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            empty_pages: self.empty_pages.load(Ordering::Relaxed),
            items_extracted: self.items_extracted.load(Ordering::Relaxed),
            items_launched: self.items_launched.load(Ordering::Relaxed),
            images_saved: self.images_saved.load(Ordering::Relaxed),
            images_failed: self.images_failed.load(Ordering::Relaxed),
            detail_pages_saved: self.detail_pages_saved.load(Ordering::Relaxed),
            detail_pages_failed: self.detail_pages_failed.load(Ordering::Relaxed),
            path_collisions: self.path_collisions.load(Ordering::Relaxed),
            worker_panics: self.worker_panics.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            elapsed,
        }
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub index_pages_saved: u64,
    pub index_pages_failed: u64,
    pub parse_failures: u64,
    pub empty_pages: u64,
    pub items_extracted: u64,
    pub items_launched: u64,
    pub images_saved: u64,
    pub images_failed: u64,
    pub detail_pages_saved: u64,
    pub detail_pages_failed: u64,
    pub path_collisions: u64,
    pub worker_panics: u64,
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Index page fetch attempts (saved + failed)
    pub fn index_pages_attempted(&self) -> u64 {
        self.index_pages_saved + self.index_pages_failed
    }

    /// Total files written, index pages included
    pub fn files_saved(&self) -> u64 {
        self.index_pages_saved + self.images_saved + self.detail_pages_saved
    }

    /// Total per-item fetches that did not produce a file
    pub fn item_failures(&self) -> u64 {
        self.images_failed + self.detail_pages_failed
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(report: &CrawlReport) {
    println!("=== Crawl Statistics ===\n");

    println!("Index pages:");
    println!("  Saved: {}", report.index_pages_saved);
    println!("  Failed: {}", report.index_pages_failed);
    println!("  Parse failures: {}", report.parse_failures);
    println!("  Empty: {}", report.empty_pages);
    println!();

    println!("Items:");
    println!("  Extracted: {}", report.items_extracted);
    println!("  Launched: {}", report.items_launched);
    println!(
        "  Images: {} saved, {} failed",
        report.images_saved, report.images_failed
    );
    println!(
        "  Detail pages: {} saved, {} failed",
        report.detail_pages_saved, report.detail_pages_failed
    );
    if report.path_collisions > 0 {
        println!("  Skipped (name collision): {}", report.path_collisions);
    }
    if report.worker_panics > 0 {
        println!("  Worker panics: {}", report.worker_panics);
    }
    println!();

    let item_fetches = report.images_saved + report.detail_pages_saved + report.item_failures();
    let success_rate = if item_fetches > 0 {
        ((report.images_saved + report.detail_pages_saved) as f64 / item_fetches as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} files written in {:.1}s)",
        success_rate,
        report.files_saved(),
        report.elapsed.as_secs_f64()
    );

    if report.cancelled {
        println!("Run was cancelled before the range was exhausted");
    }
}
