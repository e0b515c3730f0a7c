use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};

/// Name prefix of staged uploads
pub const UPLOAD_PREFIX: &str = "upload-";
/// Name prefix of compressed artifacts
pub const ARTIFACT_PREFIX: &str = "artifact-";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("upload exceeds the maximum allowed size of {limit} bytes")]
    TooLarge { limit: usize },

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Transient file area for uploads and derived artifacts.
#[async_trait]
pub trait StorageService: Send + Sync {
    fn root(&self) -> &Path;

    /// Creates an empty file under the root with a random name between
    /// `prefix` and `suffix`. The file is deleted when the returned path drops.
    fn allocate(&self, prefix: &str, suffix: &str) -> Result<TempPath, StorageError>;

    /// Streams `reader` into `path`, failing once more than `limit` bytes arrive.
    async fn write_stream<'a>(
        &self,
        path: &Path,
        reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
        limit: usize,
    ) -> Result<u64, StorageError>;

    async fn is_available(&self) -> bool;

    /// Removes every regular file under the root, returning how many were deleted.
    async fn purge(&self) -> Result<usize, StorageError>;
}

pub struct LocalStorageService {
    root: PathBuf,
}

impl LocalStorageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl StorageService for LocalStorageService {
    fn root(&self) -> &Path {
        &self.root
    }

    fn allocate(&self, prefix: &str, suffix: &str) -> Result<TempPath, StorageError> {
        let file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(&self.root)?;
        Ok(file.into_temp_path())
    }

    async fn write_stream<'a>(
        &self,
        path: &Path,
        reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
        limit: usize,
    ) -> Result<u64, StorageError> {
        let mut file = tokio::fs::File::create(path).await?;

        // One byte past the limit is enough to tell an oversized body apart
        let mut limited = reader.take(limit as u64 + 1);
        let written = tokio::io::copy(&mut limited, &mut file).await?;
        file.sync_all().await?;

        if written > limit as u64 {
            return Err(StorageError::TooLarge { limit });
        }

        debug!("Stored {} bytes at {}", written, path.display());
        Ok(written)
    }

    async fn is_available(&self) -> bool {
        tokio::fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn purge(&self) -> Result<usize, StorageError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to purge {}: {}", entry.path().display(), e),
            }
        }

        Ok(removed)
    }
}

/// Deletes `file` now instead of waiting for it to drop. A file that is
/// already gone counts as deleted; other failures are only logged.
pub fn discard(file: TempPath) {
    let path = file.to_path_buf();
    match file.close() {
        Ok(()) => debug!("Discarded {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to delete {}: {}", path.display(), e),
    }
}
