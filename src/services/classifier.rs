use serde::Serialize;

/// Compression category derived from a lowercased filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Text,
    Image,
    Pdf,
    Document,
    Archive,
    Unsupported,
}

const TEXT_EXTENSIONS: &[&str] = &["txt", "log", "json"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
const PDF_EXTENSIONS: &[&str] = &["pdf"];
const DOCUMENT_EXTENSIONS: &[&str] = &["doc", "docx"];
const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "gz", "rar", "7z"];

impl FileCategory {
    /// Accepts the extension with or without its leading dot, in any case.
    pub fn classify(extension: &str) -> Self {
        let ext = extension.trim_start_matches('.').to_lowercase();
        let ext = ext.as_str();

        if TEXT_EXTENSIONS.contains(&ext) {
            FileCategory::Text
        } else if IMAGE_EXTENSIONS.contains(&ext) {
            FileCategory::Image
        } else if PDF_EXTENSIONS.contains(&ext) {
            FileCategory::Pdf
        } else if DOCUMENT_EXTENSIONS.contains(&ext) {
            FileCategory::Document
        } else if ARCHIVE_EXTENSIONS.contains(&ext) {
            FileCategory::Archive
        } else {
            FileCategory::Unsupported
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Text => "text",
            FileCategory::Image => "image",
            FileCategory::Pdf => "pdf",
            FileCategory::Document => "document",
            FileCategory::Archive => "archive",
            FileCategory::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::split_extension;

    #[test]
    fn test_known_extensions() {
        assert_eq!(FileCategory::classify("txt"), FileCategory::Text);
        assert_eq!(FileCategory::classify("log"), FileCategory::Text);
        assert_eq!(FileCategory::classify("json"), FileCategory::Text);
        assert_eq!(FileCategory::classify("jpeg"), FileCategory::Image);
        assert_eq!(FileCategory::classify("webp"), FileCategory::Image);
        assert_eq!(FileCategory::classify("pdf"), FileCategory::Pdf);
        assert_eq!(FileCategory::classify("docx"), FileCategory::Document);
        assert_eq!(FileCategory::classify("7z"), FileCategory::Archive);
        assert_eq!(FileCategory::classify("gz"), FileCategory::Archive);
    }

    #[test]
    fn test_case_insensitive() {
        let (_, ext) = split_extension("IMG.PNG");
        assert_eq!(FileCategory::classify(&ext), FileCategory::Image);
        assert_eq!(FileCategory::classify("PdF"), FileCategory::Pdf);
        assert_eq!(FileCategory::classify(".DOC"), FileCategory::Document);
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(FileCategory::classify(""), FileCategory::Unsupported);
        assert_eq!(FileCategory::classify("exe"), FileCategory::Unsupported);
        assert_eq!(FileCategory::classify("tar"), FileCategory::Unsupported);
        assert_eq!(FileCategory::classify("txt.bak"), FileCategory::Unsupported);
    }
}
