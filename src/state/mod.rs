//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageStage`: The stage of the index page currently being processed
//! - `PageTask`: One page number with its index URL and destination path
//! - `PageOutcome`: How a finished page ended

mod page_state;

// Re-export main types
pub use page_state::{PageOutcome, PageStage, PageTask};
