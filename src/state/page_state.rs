//! Per-page state machine driven by the crawl coordinator
//!
//! Each index page walks `FetchIndex → ExtractItems → FanOutDownloads →
//! AwaitDrain → Advance`. A failed index fetch or extraction jumps straight to
//! `Advance`.

use crate::CrawlError;
use std::fmt;
use std::path::PathBuf;

/// The stage a page is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageStage {
    /// Downloading the index page to `root/<n>.html`
    FetchIndex,

    /// Parsing item records out of the index page
    ExtractItems,

    /// Launching item downloaders through the paced pool
    FanOutDownloads,

    /// Waiting for every launched downloader to finish
    AwaitDrain,

    /// Done with this page
    Advance,
}

impl PageStage {
    /// Returns true if `next` is a legal successor of this stage
    pub fn can_transition_to(&self, next: PageStage) -> bool {
        use PageStage::*;
        matches!(
            (self, next),
            (FetchIndex, ExtractItems)
                | (FetchIndex, Advance)
                | (ExtractItems, FanOutDownloads)
                | (ExtractItems, Advance)
                | (FanOutDownloads, AwaitDrain)
                | (AwaitDrain, Advance)
        )
    }

    /// Returns true once nothing else will happen for the page
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Advance)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchIndex => "fetch_index",
            Self::ExtractItems => "extract_items",
            Self::FanOutDownloads => "fan_out_downloads",
            Self::AwaitDrain => "await_drain",
            Self::Advance => "advance",
        }
    }
}

impl fmt::Display for PageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a page ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Items were extracted and all of their downloaders drained
    Downloaded { items: usize },

    /// The index page parsed but listed no items
    Empty,

    /// The index page could not be fetched or saved
    IndexFailed,

    /// The index page was fetched but could not be parsed
    ParseFailed,

    /// The run was cancelled while this page was in progress
    Cancelled,
}

/// One page of the requested range
///
/// Owned by the coordinator for the duration of a single iteration.
#[derive(Debug)]
pub struct PageTask {
    pub page: u32,
    pub index_url: String,
    pub index_path: PathBuf,
    stage: PageStage,
}

impl PageTask {
    pub fn new(page: u32, index_url: String, index_path: PathBuf) -> Self {
        Self {
            page,
            index_url,
            index_path,
            stage: PageStage::FetchIndex,
        }
    }

    pub fn stage(&self) -> PageStage {
        self.stage
    }

    /// Moves the page to `next`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The transition is legal and was applied
    /// * `Err(CrawlError::InvalidTransition)` - The transition is not allowed
    pub fn advance(&mut self, next: PageStage) -> Result<(), CrawlError> {
        if !self.stage.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.stage,
                to: next,
            });
        }
        tracing::trace!("Page {}: {} -> {}", self.page, self.stage, next);
        self.stage = next;
        Ok(())
    }

    /// Abandons the page, jumping to `Advance` from any non-terminal stage
    /// that allows it
    pub fn abandon(&mut self) -> Result<(), CrawlError> {
        self.advance(PageStage::Advance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> PageTask {
        PageTask::new(
            7,
            "https://newcomic.info/page/7".to_string(),
            PathBuf::from("/tmp/1-10/7.html"),
        )
    }

    #[test]
    fn test_happy_path() {
        let mut task = task();
        assert_eq!(task.stage(), PageStage::FetchIndex);

        for next in [
            PageStage::ExtractItems,
            PageStage::FanOutDownloads,
            PageStage::AwaitDrain,
            PageStage::Advance,
        ] {
            task.advance(next).unwrap();
        }

        assert!(task.stage().is_terminal());
    }

    #[test]
    fn test_abandon_after_failed_fetch() {
        let mut task = task();
        assert!(task.abandon().is_ok());
        assert_eq!(task.stage(), PageStage::Advance);
    }

    #[test]
    fn test_abandon_after_failed_extraction() {
        let mut task = task();
        task.advance(PageStage::ExtractItems).unwrap();
        assert!(task.abandon().is_ok());
    }

    #[test]
    fn test_cannot_skip_drain() {
        let mut task = task();
        task.advance(PageStage::ExtractItems).unwrap();
        task.advance(PageStage::FanOutDownloads).unwrap();

        let result = task.advance(PageStage::Advance);
        assert!(matches!(
            result,
            Err(CrawlError::InvalidTransition {
                from: PageStage::FanOutDownloads,
                to: PageStage::Advance,
            })
        ));
        assert_eq!(task.stage(), PageStage::FanOutDownloads);
    }

    #[test]
    fn test_advance_is_terminal() {
        assert!(!PageStage::Advance.can_transition_to(PageStage::FetchIndex));
        assert!(!PageStage::FetchIndex.can_transition_to(PageStage::FanOutDownloads));
    }

    #[test]
    fn test_display() {
        assert_eq!(PageStage::AwaitDrain.to_string(), "await_drain");
    }
}
