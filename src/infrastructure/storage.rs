use crate::config::CompressorConfig;
use crate::services::storage::{LocalStorageService, StorageService};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &CompressorConfig) -> anyhow::Result<Arc<dyn StorageService>> {
    let dir = &config.upload_dir;

    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create upload directory {}", dir.display()))?;

    info!("📁 Storage Area: {}", dir.display());

    let storage = LocalStorageService::new(dir);

    // Anything still here was orphaned by a previous process
    if config.purge_on_start {
        let removed = storage.purge().await?;
        if removed > 0 {
            info!("🧹 Purged {} leftover file(s) from the Storage Area", removed);
        }
    }

    Ok(Arc::new(storage))
}
