use crate::utils::validation::split_extension;
use std::path::Path;
use tempfile::TempPath;

/// A file received from the client and staged in the Storage Area.
#[derive(Debug)]
pub struct UploadedFile {
    pub file: TempPath,
    pub original_name: String,
    pub size: u64,
    pub extension: String,
}

impl UploadedFile {
    pub fn new(file: TempPath, original_name: String, size: u64) -> Self {
        let (_, extension) = split_extension(&original_name);
        Self {
            file,
            original_name,
            size,
            extension,
        }
    }

    pub fn path(&self) -> &Path {
        &self.file
    }
}

/// The output of one transform, deleted once the response is finished.
#[derive(Debug)]
pub struct CompressedArtifact {
    pub file: TempPath,
    pub download_name: String,
    pub content_type: &'static str,
    pub size: u64,
}

impl CompressedArtifact {
    pub fn path(&self) -> &Path {
        &self.file
    }
}
