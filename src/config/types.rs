use serde::Deserialize;

/// Main configuration structure for Catalog-Crawler
///
/// Every section is optional in the TOML file; missing sections fall back to
/// the defaults for the newcomic.info catalog layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub selectors: SelectorConfig,
}

/// Where the catalog lives
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site root; its origin prefixes site-relative image URLs and it is the
    /// base for resolving relative detail links
    #[serde(rename = "site-url")]
    pub site_url: String,

    /// Index page URL with a `{page}` placeholder for the page number
    #[serde(rename = "index-url-template")]
    pub index_url_template: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_url: "https://newcomic.info/".to_string(),
            index_url_template: "https://newcomic.info/page/{page}".to_string(),
        }
    }
}

/// Crawler pacing and concurrency configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Delay between successive item downloader launches (milliseconds)
    #[serde(rename = "launch-delay-ms")]
    pub launch_delay_ms: u64,

    /// Maximum number of item downloaders in flight at once
    #[serde(rename = "max-concurrent-items")]
    pub max_concurrent_items: u32,

    /// Whole-request deadline (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// TCP connect deadline (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            launch_delay_ms: 300,
            max_concurrent_items: 8,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// Optional URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "catalog-crawler".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// How downloaded files are named
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlugStrategy {
    /// The URL's trailing path segment
    #[default]
    TrailingSegment,
    /// A SHA-256 prefix of the full URL plus the trailing segment's extension
    Hashed,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory under which `<start>-<end>` run roots are created
    #[serde(rename = "base-dir")]
    pub base_dir: String,

    #[serde(rename = "slug-strategy")]
    pub slug_strategy: SlugStrategy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: "./downloads".to_string(),
            slug_strategy: SlugStrategy::TrailingSegment,
        }
    }
}

/// CSS selectors describing the index page markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// One match per catalog item
    pub item: String,

    /// Region inside an item holding tag anchors and the info text
    pub mask: String,

    /// Tag anchors, matched inside the mask region
    pub tag: String,

    /// Anchor carrying the title attribute and detail link
    #[serde(rename = "primary-anchor")]
    pub primary_anchor: String,

    /// Cover image element
    pub image: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            item: ".newcomic-short".to_string(),
            mask: ".newcomic-mask-top".to_string(),
            tag: "a".to_string(),
            primary_anchor: ".newcomic-mask-bottom a".to_string(),
            image: "img".to_string(),
        }
    }
}
