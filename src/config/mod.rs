//! Configuration module for Catalog-Crawler
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Without a file the built-in defaults are used.
//!
//! # Example
//!
//! ```no_run
//! use catalog_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Launch delay: {}ms", config.crawler.launch_delay_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, SelectorConfig, SiteConfig, SlugStrategy,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{load_config, load_or_default, parse_config};
pub use validation::{validate, PAGE_PLACEHOLDER};
