use crate::PersistError;
use dashmap::DashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Suffix of the temporary file a blob is written to before it is renamed
/// into place
const PART_SUFFIX: &str = ".part";

/// Writes downloaded blobs to disk
///
/// Every destination path can be claimed once per run. Writes go to
/// `<path>.part` first and are renamed onto `<path>` only after the whole
/// buffer is flushed, so a failed write never leaves a truncated file under
/// the final name.
#[derive(Debug, Default)]
pub struct FileStore {
    claims: DashSet<PathBuf>,
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `path` and its `.part` sibling for a single writer
    ///
    /// Returns false if another fetch in this run already claimed either
    /// name, so a slug ending in `.part` never lands on another write's
    /// temporary file.
    pub fn claim(&self, path: &Path) -> bool {
        if !self.claims.insert(path.to_path_buf()) {
            return false;
        }
        if !self.claims.insert(part_path(path)) {
            self.claims.remove(path);
            return false;
        }
        true
    }

    /// Creates or truncates `path` with the full contents of `bytes`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The file is complete on disk
    /// * `Err(PersistError)` - Nothing was left under `path` by this call
    pub async fn persist(&self, path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
        let part = part_path(path);

        if let Err(source) = write_file(&part, bytes).await {
            remove_quietly(&part).await;
            return Err(PersistError {
                path: path.to_path_buf(),
                source,
            });
        }

        if let Err(source) = tokio::fs::rename(&part, path).await {
            remove_quietly(&part).await;
            return Err(PersistError {
                path: path.to_path_buf(),
                source,
            });
        }

        tracing::trace!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(PART_SUFFIX);
    PathBuf::from(name)
}

async fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!("Could not remove partial file {}: {}", path.display(), e);
        }
    }
}
