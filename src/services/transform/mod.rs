//! Per-category transforms from an uploaded file to a compressed artifact.
//!
//! Every strategy is a blocking function over two paths in the Storage Area.

pub mod package;
pub mod pdf;
pub mod raster;
pub mod text;

use std::path::Path;
use tempfile::TempPath;
use thiserror::Error;

pub use raster::ImageKind;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("invalid document: file does not start with %PDF-")]
    InvalidDocument,

    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("JPEG encoding failed: {0}")]
    Jpeg(#[from] jpeg_encoder::EncodingError),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),

    #[error("image dimensions {0}x{1} are too large to encode")]
    Dimensions(u32, u32),

    #[error("PDF processing failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("zip packaging failed: {0}")]
    Archive(#[from] zip::result::ZipError),

    // Only the kind: the message of an io::Error may carry a path
    #[error("I/O error: {}", .0.kind())]
    Io(#[from] std::io::Error),

    #[error("transform task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// The transform applied to one category of upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Gzip,
    Image(ImageKind),
    PdfRewrite,
    ZipPackage,
}

impl Strategy {
    /// File suffix of the artifact in the Storage Area.
    pub fn output_suffix(&self) -> &'static str {
        match self {
            Strategy::Gzip => ".gz",
            Strategy::Image(kind) => kind.suffix(),
            Strategy::PdfRewrite => ".pdf",
            Strategy::ZipPackage => ".zip",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Strategy::Gzip => "application/gzip",
            Strategy::Image(kind) => kind.content_type(),
            Strategy::PdfRewrite => "application/pdf",
            Strategy::ZipPackage => "application/zip",
        }
    }

    /// Runs the transform on the blocking pool.
    ///
    /// Both guards move into the blocking task, so they are dropped there
    /// even if the caller stops waiting: the source as soon as the transform
    /// ends, the output too unless it is handed back on success.
    pub async fn apply(
        self,
        source: TempPath,
        output: TempPath,
        original_name: String,
    ) -> Result<TempPath, TransformError> {
        tokio::task::spawn_blocking(move || {
            let (input, target): (&Path, &Path) = (&source, &output);
            let result = match self {
                Strategy::Gzip => text::gzip_file(input, target, &original_name),
                Strategy::Image(kind) => raster::reencode_image(input, target, kind),
                Strategy::PdfRewrite => pdf::rewrite_pdf(input, target),
                Strategy::ZipPackage => package::zip_file(input, target, &original_name),
            };
            drop(source);
            result.map(|()| output)
        })
        .await?
    }
}
