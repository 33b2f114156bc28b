//! Index page extraction
//!
//! This module turns one catalog index page into item records:
//! - title and detail link from the item's primary anchor
//! - tags from every anchor inside the item's mask region, in document order
//! - the mask region's own text (page count, size)
//! - the cover image URL, made absolute when it is site-relative
//!
//! Missing pieces never fail extraction; they come back as empty strings.

use crate::config::SelectorConfig;
use crate::url::{absolutize_image_url, resolve_detail_url};
use crate::{ConfigError, CrawlError, ParseError};
use scraper::{ElementRef, Html, Selector};
use std::borrow::Cow;
use url::Url;

/// One catalog entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemRecord {
    /// Title attribute of the primary anchor
    pub title: String,

    /// Absolute cover image URL
    pub image_url: String,

    /// Absolute detail page URL (empty if the item had no link)
    pub detail_url: String,

    /// Tag labels in document order, duplicates kept
    pub tags: Vec<String>,

    /// Reserved for a direct download link; never filled by extraction
    pub download_url: String,

    /// Free text of the mask region itself, e.g. "24 pages, 30 MB"
    pub info: String,
}

/// Compiled selectors plus the site URL used to absolutize links
#[derive(Debug)]
pub struct Extractor {
    item: Selector,
    mask: Selector,
    tag: Selector,
    primary_anchor: Selector,
    image: Selector,
    site: Url,
}

impl Extractor {
    /// Compiles the configured selectors
    ///
    /// # Returns
    ///
    /// * `Ok(Extractor)` - All selectors compiled and the site URL parsed
    /// * `Err(CrawlError)` - A selector or the site URL is invalid
    pub fn new(selectors: &SelectorConfig, site_url: &str) -> Result<Self, CrawlError> {
        let site = Url::parse(site_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site-url: {}", e)))?;

        Ok(Self {
            item: compile(&selectors.item)?,
            mask: compile(&selectors.mask)?,
            tag: compile(&selectors.tag)?,
            primary_anchor: compile(&selectors.primary_anchor)?,
            image: compile(&selectors.image)?,
            site,
        })
    }

    /// Extracts item records from raw index page bytes
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ItemRecord>)` - Items in document order; empty when the page
    ///   lists nothing
    /// * `Err(ParseError::Binary)` - The body holds NUL bytes and is not markup
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD and the rest
    /// of the page is still extracted.
    pub fn extract(&self, document: &[u8]) -> Result<Vec<ItemRecord>, ParseError> {
        if let Some(offset) = document.iter().position(|&b| b == 0) {
            return Err(ParseError::Binary { offset });
        }

        let html = String::from_utf8_lossy(document);
        if let Cow::Owned(_) = html {
            tracing::warn!("Index page is not valid UTF-8, undecodable bytes were replaced");
        }
        Ok(self.extract_str(&html))
    }

    /// Extracts item records from an HTML string
    pub fn extract_str(&self, html: &str) -> Vec<ItemRecord> {
        let document = Html::parse_document(html);

        document
            .select(&self.item)
            .map(|block| self.extract_item(block))
            .collect()
    }

    fn extract_item(&self, block: ElementRef<'_>) -> ItemRecord {
        let mut record = ItemRecord::default();

        for mask in block.select(&self.mask) {
            if record.info.is_empty() {
                record.info = own_text(mask);
            }
            for anchor in mask.select(&self.tag) {
                record.tags.push(anchor.text().collect::<String>().trim().to_string());
            }
        }

        // Several matches: the last one wins
        if let Some(anchor) = block.select(&self.primary_anchor).last() {
            let element = anchor.value();
            record.title = element.attr("title").unwrap_or_default().trim().to_string();
            record.detail_url =
                resolve_detail_url(element.attr("href").unwrap_or_default(), &self.site);
        }

        let src = block
            .select(&self.image)
            .next()
            .and_then(|img| img.value().attr("src"))
            .unwrap_or_default();
        record.image_url = absolutize_image_url(src, &self.site);

        record
    }
}

fn compile(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Text nodes directly under `element`, without its children's text
fn own_text(element: ElementRef<'_>) -> String {
    let text: String = element
        .children()
        .filter_map(|child| child.value().as_text())
        .map(|text| &**text)
        .collect();

    // Tag separators leave stray commas around the text
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}
