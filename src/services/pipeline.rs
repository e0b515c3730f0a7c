use crate::models::{CompressedArtifact, UploadedFile};
use crate::services::classifier::FileCategory;
use crate::services::storage::{ARTIFACT_PREFIX, StorageError, StorageService, discard};
use crate::services::transform::{ImageKind, Strategy, TransformError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Stages a request moves through; failures jump to `CleaningUp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Validated,
    Classified,
    Transforming,
    Streaming,
    CleaningUp,
    Done,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no file uploaded")]
    NoFile,

    #[error("unsupported file type: .{0}")]
    UnsupportedType(String),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Turns one staged upload into one compressed artifact.
///
/// The pipeline holds no per-request state; every upload and artifact is
/// owned by the call that handles it.
pub struct CompressionPipeline {
    storage: Arc<dyn StorageService>,
}

impl CompressionPipeline {
    pub fn new(storage: Arc<dyn StorageService>) -> Self {
        Self { storage }
    }

    pub async fn run(&self, upload: UploadedFile) -> Result<CompressedArtifact, PipelineError> {
        debug!(stage = ?PipelineStage::Received, file = %upload.original_name, size = upload.size);

        if upload.size == 0 {
            return Err(reject(upload, PipelineError::NoFile));
        }
        debug!(stage = ?PipelineStage::Validated, file = %upload.original_name);

        let category = FileCategory::classify(&upload.extension);
        let strategy = match category {
            FileCategory::Text => Strategy::Gzip,
            FileCategory::Image => match ImageKind::from_extension(&upload.extension) {
                Some(kind) => Strategy::Image(kind),
                None => {
                    let ext = upload.extension.clone();
                    return Err(reject(upload, PipelineError::UnsupportedType(ext)));
                }
            },
            FileCategory::Pdf => Strategy::PdfRewrite,
            // Archives get zip-wrapped as well, even though they are already compressed
            FileCategory::Document | FileCategory::Archive => Strategy::ZipPackage,
            FileCategory::Unsupported => {
                let ext = upload.extension.clone();
                return Err(reject(upload, PipelineError::UnsupportedType(ext)));
            }
        };
        debug!(stage = ?PipelineStage::Classified, %category, ?strategy);

        let output = match self.storage.allocate(ARTIFACT_PREFIX, strategy.output_suffix()) {
            Ok(output) => output,
            Err(e) => return Err(reject(upload, e.into())),
        };

        debug!(stage = ?PipelineStage::Transforming, file = %upload.original_name);
        let UploadedFile {
            file,
            original_name,
            size,
            ..
        } = upload;

        // The source is deleted inside `apply` whatever the outcome
        let output = strategy
            .apply(file, output, original_name.clone())
            .await
            .map_err(|e| {
                match e {
                    TransformError::InvalidDocument => {
                        warn!(stage = ?PipelineStage::CleaningUp, "Rejected {}: {}", original_name, e)
                    }
                    _ => error!(stage = ?PipelineStage::CleaningUp, "Transform of {} failed: {}", original_name, e),
                }
                e
            })?;

        let compressed_size = tokio::fs::metadata(&*output)
            .await
            .map_err(TransformError::from)?
            .len();

        info!(
            "Compressed {} ({}): {} -> {} bytes",
            original_name, category, size, compressed_size
        );

        Ok(CompressedArtifact {
            file: output,
            download_name: format!("compressed-{}", original_name),
            content_type: strategy.content_type(),
            size: compressed_size,
        })
    }
}

fn reject(upload: UploadedFile, err: PipelineError) -> PipelineError {
    warn!(stage = ?PipelineStage::CleaningUp, "Rejected {}: {}", upload.original_name, err);
    discard(upload.file);
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::{LocalStorageService, UPLOAD_PREFIX};
    use tempfile::TempDir;

    fn stage(storage: &Arc<dyn StorageService>, name: &str, data: &[u8]) -> UploadedFile {
        let path = storage.allocate(UPLOAD_PREFIX, "").unwrap();
        std::fs::write(&path, data).unwrap();
        UploadedFile::new(path, name.to_string(), data.len() as u64)
    }

    fn file_count(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_text_upload_leaves_only_artifact() {
        let dir = TempDir::new().unwrap();
        let storage: Arc<dyn StorageService> = Arc::new(LocalStorageService::new(dir.path()));
        let pipeline = CompressionPipeline::new(storage.clone());

        let upload = stage(&storage, "notes.TXT", b"some notes\n");
        let source = upload.path().to_path_buf();
        let artifact = pipeline.run(upload).await.unwrap();

        assert!(!source.exists());
        assert!(artifact.path().exists());
        assert_eq!(artifact.download_name, "compressed-notes.TXT");
        assert_eq!(artifact.content_type, "application/gzip");
        assert_eq!(file_count(&dir), 1);

        drop(artifact);
        assert_eq!(file_count(&dir), 0);
    }

    #[tokio::test]
    async fn test_long_name_kept_out_of_storage_paths() {
        let dir = TempDir::new().unwrap();
        let storage: Arc<dyn StorageService> = Arc::new(LocalStorageService::new(dir.path()));
        let pipeline = CompressionPipeline::new(storage.clone());
        let name = format!("{}.txt", "n".repeat(300));

        let artifact = pipeline.run(stage(&storage, &name, b"long name")).await.unwrap();

        assert_eq!(artifact.download_name, format!("compressed-{}", name));
        let stored = artifact.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(stored.starts_with(ARTIFACT_PREFIX));
        assert!(stored.ends_with(".gz"));
        assert!(stored.len() < 32);
    }

    #[tokio::test]
    async fn test_unsupported_type_deletes_source() {
        let dir = TempDir::new().unwrap();
        let storage: Arc<dyn StorageService> = Arc::new(LocalStorageService::new(dir.path()));
        let pipeline = CompressionPipeline::new(storage.clone());

        let upload = stage(&storage, "setup.exe", b"MZ\x90\x00");
        let result = pipeline.run(upload).await;

        assert!(matches!(result, Err(PipelineError::UnsupportedType(ext)) if ext == "exe"));
        assert_eq!(file_count(&dir), 0);
    }

    #[tokio::test]
    async fn test_empty_upload_is_no_file() {
        let dir = TempDir::new().unwrap();
        let storage: Arc<dyn StorageService> = Arc::new(LocalStorageService::new(dir.path()));
        let pipeline = CompressionPipeline::new(storage.clone());

        let result = pipeline.run(stage(&storage, "empty.txt", b"")).await;

        assert!(matches!(result, Err(PipelineError::NoFile)));
        assert_eq!(file_count(&dir), 0);
    }

    #[tokio::test]
    async fn test_transform_failure_deletes_everything() {
        let dir = TempDir::new().unwrap();
        let storage: Arc<dyn StorageService> = Arc::new(LocalStorageService::new(dir.path()));
        let pipeline = CompressionPipeline::new(storage.clone());

        let upload = stage(&storage, "photo.jpg", b"\xFF\xD8\xFF\xE0 truncated");
        let result = pipeline.run(upload).await;

        assert!(matches!(result, Err(PipelineError::Transform(TransformError::Image(_)))));
        assert_eq!(file_count(&dir), 0);
    }

    #[tokio::test]
    async fn test_invalid_pdf_rejected() {
        let dir = TempDir::new().unwrap();
        let storage: Arc<dyn StorageService> = Arc::new(LocalStorageService::new(dir.path()));
        let pipeline = CompressionPipeline::new(storage.clone());

        let result = pipeline.run(stage(&storage, "doc.pdf", b"hello")).await;

        assert!(matches!(
            result,
            Err(PipelineError::Transform(TransformError::InvalidDocument))
        ));
        assert_eq!(file_count(&dir), 0);
    }
}
