//! Asset staging.

use verbatim_core::models::MediaAsset;
use verbatim_storage::{Storage, StorageError, StorageResult};

/// Reads the input file from disk and uploads it under its bare file name.
///
/// The staging key carries no folder prefix; the remote worker sees a flat
/// bucket namespace.
pub async fn stage_input(storage: &dyn Storage, asset: &MediaAsset) -> StorageResult<()> {
    let path = asset.local_path();
    let data = tokio::fs::read(&path).await.map_err(|e| {
        StorageError::UploadFailed(format!("Failed to read {}: {}", path.display(), e))
    })?;

    tracing::info!(
        path = %path.display(),
        key = %asset.storage_key(),
        size_bytes = data.len(),
        "Staging input asset"
    );

    storage.put(asset.storage_key(), data).await
}
