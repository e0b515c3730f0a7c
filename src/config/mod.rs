use std::env;
use std::path::PathBuf;

/// Runtime configuration for the compression service
#[derive(Debug, Clone)]
pub struct CompressorConfig {
    /// Maximum upload size in bytes (default: 20 MB)
    pub max_file_size: usize,

    /// Directory used as the transient Storage Area
    pub upload_dir: PathBuf,

    /// Remove leftover files from the Storage Area on startup (default: true)
    pub purge_on_start: bool,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            max_file_size: 20 * 1024 * 1024, // 20 MB
            upload_dir: env::temp_dir().join("compressor-uploads"),
            purge_on_start: true,
        }
    }
}

impl CompressorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            upload_dir: env::var("UPLOAD_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            purge_on_start: env::var("PURGE_ON_START")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(default.purge_on_start),
        }
    }

    /// Config for local development and tests, rooted at the given directory
    pub fn development(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            max_file_size: 20 * 1024 * 1024,
            upload_dir: upload_dir.into(),
            purge_on_start: false,
        }
    }
}
