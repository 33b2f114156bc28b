use crate::config::SlugStrategy;
use sha2::{Digest, Sha256};
use url::Url;

/// File name used when a URL has no usable trailing path segment
pub const FALLBACK_SLUG: &str = "unnamed";

/// Number of hex characters of the SHA-256 digest kept by hashed slugs
const HASH_PREFIX_LEN: usize = 16;

/// Derives a local file name from the trailing path segment of a URL
///
/// # Rules
///
/// 1. If the text parses as an absolute URL, take the last path segment
///    (query and fragment are not part of the path)
/// 2. Otherwise take the text after the last `/`, minus any `?query` or
///    `#fragment`
/// 3. If there is no `/` at all, or the segment is empty, `.` or `..`, return
///    [`FALLBACK_SLUG`]
///
/// Two different URLs with the same trailing segment map to the same slug;
/// the crawler's path registry refuses the second write rather than
/// overwriting the first.
///
/// # Examples
///
/// ```
/// use catalog_crawler::url::{slug_from_url, FALLBACK_SLUG};
///
/// assert_eq!(slug_from_url("https://newcomic.info/uploads/cover.jpg"), "cover.jpg");
/// assert_eq!(slug_from_url("/d/a.html"), "a.html");
/// assert_eq!(slug_from_url("noslash"), FALLBACK_SLUG);
/// ```
pub fn slug_from_url(url: &str) -> String {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string),
        Err(_) => {
            let without_suffix = url.split(['?', '#']).next().unwrap_or(url);
            without_suffix
                .rfind('/')
                .map(|idx| without_suffix[idx + 1..].to_string())
        }
    };

    match segment {
        Some(segment) if is_usable_segment(&segment) => segment,
        _ => FALLBACK_SLUG.to_string(),
    }
}

/// Derives a collision-resistant file name: a SHA-256 prefix of the full URL
/// followed by the trailing segment's extension, if it has a short one
pub fn hashed_slug(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let hash = hex::encode(digest);
    let prefix = &hash[..HASH_PREFIX_LEN];

    match extension_of(&slug_from_url(url)) {
        Some(ext) => format!("{}.{}", prefix, ext),
        None => prefix.to_string(),
    }
}

/// Picks the slug function for the configured strategy
pub fn slug_for(strategy: SlugStrategy, url: &str) -> String {
    match strategy {
        SlugStrategy::TrailingSegment => slug_from_url(url),
        SlugStrategy::Hashed => hashed_slug(url),
    }
}

fn is_usable_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['\\', '\0'])
}

fn extension_of(slug: &str) -> Option<&str> {
    if slug == FALLBACK_SLUG {
        return None;
    }
    let (_, ext) = slug.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}
