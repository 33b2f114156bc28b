use crate::crawler::PageRange;
use crate::CrawlError;
use std::path::{Path, PathBuf};

/// Directory name for saved detail pages
pub const PAGES_DIR: &str = "pages";

/// Directory name for saved cover images
pub const IMAGES_DIR: &str = "images";

/// The output tree of one run
///
/// ```text
/// <base>/<start>-<end>/
///   <n>.html
///   pages/<slug>
///   images/<slug>
/// ```
#[derive(Debug, Clone)]
pub struct RunLayout {
    base: PathBuf,
    root: PathBuf,
    pages: PathBuf,
    images: PathBuf,
}

impl RunLayout {
    pub fn new(base_dir: impl AsRef<Path>, range: PageRange) -> Self {
        let base = base_dir.as_ref().to_path_buf();
        let root = base.join(format!("{}-{}", range.start(), range.end()));
        let pages = root.join(PAGES_DIR);
        let images = root.join(IMAGES_DIR);

        Self {
            base,
            root,
            pages,
            images,
        }
    }

    /// Creates the run tree
    ///
    /// The base directory is created if missing. The run root itself must not
    /// exist yet: creating it is deliberately not idempotent, so a second run
    /// over the same range fails here instead of mixing outputs.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Root, `pages` and `images` were created
    /// * `Err(CrawlError::Directory)` - Any directory could not be created
    pub async fn create(&self) -> Result<(), CrawlError> {
        tokio::fs::create_dir_all(&self.base)
            .await
            .map_err(|source| CrawlError::Directory {
                path: self.base.clone(),
                source,
            })?;

        for dir in [&self.root, &self.pages, &self.images] {
            tokio::fs::create_dir(dir)
                .await
                .map_err(|source| CrawlError::Directory {
                    path: dir.clone(),
                    source,
                })?;
        }

        tracing::info!("Created output directory {}", self.root.display());
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pages_dir(&self) -> &Path {
        &self.pages
    }

    pub fn images_dir(&self) -> &Path {
        &self.images
    }

    /// `root/<page>.html`
    pub fn index_path(&self, page: u32) -> PathBuf {
        self.root.join(format!("{}.html", page))
    }

    pub fn page_path(&self, slug: &str) -> PathBuf {
        self.pages.join(slug)
    }

    pub fn image_path(&self, slug: &str) -> PathBuf {
        self.images.join(slug)
    }
}
