//! Output module for reporting crawl results
//!
//! Counters are collected while the crawl runs and summarized once it ends.

mod stats;

pub use stats::{print_statistics, CrawlReport, CrawlStatistics};
