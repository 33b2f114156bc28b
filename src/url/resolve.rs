use crate::config::PAGE_PLACEHOLDER;
use url::Url;

/// Makes a cover image `src` absolute
///
/// - `//host/path` gets the site's scheme
/// - `/path` gets the site's origin (`scheme://host[:port]`) prepended
/// - anything else, including already absolute URLs and the empty string, is
///   returned unchanged
pub fn absolutize_image_url(src: &str, site: &Url) -> String {
    let src = src.trim();

    if src.starts_with("//") {
        format!("{}:{}", site.scheme(), src)
    } else if src.starts_with('/') {
        format!("{}{}", site.origin().ascii_serialization(), src)
    } else {
        src.to_string()
    }
}

/// Resolves a detail page link against the site URL
///
/// An empty href stays empty; an href that cannot be joined is returned as-is
/// and will fail later as an invalid URL.
pub fn resolve_detail_url(href: &str, site: &Url) -> String {
    let href = href.trim();

    if href.is_empty() {
        return String::new();
    }

    match site.join(href) {
        Ok(absolute) => absolute.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Fills the page number into the index URL template
pub fn index_page_url(template: &str, page: u32) -> String {
    template.replace(PAGE_PLACEHOLDER, &page.to_string())
}
