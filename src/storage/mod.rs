//! Storage module for downloaded content
//!
//! This module owns everything the crawler writes to disk:
//! - The per-run directory tree (`<start>-<end>/`, `pages/`, `images/`)
//! - Whole-buffer blob writes that never leave truncated files behind
//! - The registry guaranteeing one writer per destination path

mod file_store;
mod layout;

pub use file_store::FileStore;
pub use layout::{RunLayout, IMAGES_DIR, PAGES_DIR};
