//! Catalog-Crawler main entry point
//!
//! This is the command-line interface for the paginated catalog crawler.

use anyhow::Context;
use catalog_crawler::config::{load_or_default, Config};
use catalog_crawler::crawler::{crawl, PageRange};
use catalog_crawler::output::print_statistics;
use catalog_crawler::storage::RunLayout;
use catalog_crawler::url::index_page_url;
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Catalog-Crawler: a paced downloader for paginated catalog sites
///
/// Walks index pages START_PAGE through END_PAGE in order and saves every
/// listed item's cover image and detail page under
/// `<base-dir>/<START_PAGE>-<END_PAGE>/`.
#[derive(Parser, Debug)]
#[command(name = "catalog-crawler")]
#[command(version)]
#[command(about = "A paced downloader for paginated catalog sites", long_about = None)]
struct Cli {
    /// First index page to crawl
    #[arg(value_name = "START_PAGE")]
    start_page: u32,

    /// Last index page to crawl (inclusive); a range with END_PAGE below
    /// START_PAGE is rejected
    #[arg(value_name = "END_PAGE")]
    end_page: u32,

    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without making requests
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let range = PageRange::new(cli.start_page, cli.end_page)?;

    match &cli.config {
        Some(path) => tracing::info!("Loading configuration from: {}", path.display()),
        None => tracing::info!("No configuration file given, using defaults"),
    }
    let config = load_or_default(cli.config.as_deref()).context("Failed to load configuration")?;

    if cli.dry_run {
        handle_dry_run(&config, range);
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight work");
            signal.cancel();
        }
    });

    let report = crawl(config, range, cancel)
        .await
        .with_context(|| format!("Crawl of pages {}-{} failed", range.start(), range.end()))?;

    if !cli.quiet {
        print_statistics(&report);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_crawler=info,warn"),
            1 => EnvFilter::new("catalog_crawler=debug,info"),
            2 => EnvFilter::new("catalog_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective settings and the index
/// URLs that would be requested
fn handle_dry_run(config: &Config, range: PageRange) {
    println!("=== Catalog-Crawler Dry Run ===\n");

    println!("Site:");
    println!("  Site URL: {}", config.site.site_url);
    println!("  Index template: {}", config.site.index_url_template);

    println!("\nCrawler:");
    println!("  Launch delay: {}ms", config.crawler.launch_delay_ms);
    println!(
        "  Max concurrent items: {}",
        config.crawler.max_concurrent_items
    );
    println!(
        "  Timeouts: {}s request, {}s connect",
        config.crawler.request_timeout_secs, config.crawler.connect_timeout_secs
    );
    println!("  User agent: {}", config.user_agent.header_value());

    let layout = RunLayout::new(&config.output.base_dir, range);
    println!("\nOutput:");
    println!("  Run directory: {}", layout.root().display());
    println!("  Slug strategy: {:?}", config.output.slug_strategy);

    println!("\nIndex pages ({}):", range.len());
    for page in range.pages() {
        println!(
            "  {} -> {}",
            index_page_url(&config.site.index_url_template, page),
            layout.index_path(page).display()
        );
    }

    println!("\n✓ Configuration is valid");
}
