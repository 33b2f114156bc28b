//! URL handling module for Catalog-Crawler
//!
//! This module turns the raw attribute values found on index pages into
//! fetchable URLs, builds index page URLs, and derives local file names
//! (slugs) from URLs.

mod resolve;
mod slug;

// Re-export main functions
pub use resolve::{absolutize_image_url, index_page_url, resolve_detail_url};
pub use slug::{hashed_slug, slug_for, slug_from_url, FALLBACK_SLUG};
