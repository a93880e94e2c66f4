//! Result retrieval.

use std::path::{Path, PathBuf};

use verbatim_core::models::{OutputFormat, OutputTargets};
use verbatim_storage::{Storage, StorageError};

/// Outcome of downloading the output artifacts.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub fetched: Vec<(OutputFormat, PathBuf)>,
    pub failed: Vec<(OutputFormat, StorageError)>,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Downloads each output artifact into the media folder, overwriting any
/// file a previous run left there. A failed format is recorded and the
/// remaining formats are still attempted.
pub async fn fetch_results(
    storage: &dyn Storage,
    folder: &Path,
    targets: &OutputTargets,
) -> FetchReport {
    let mut report = FetchReport::default();

    for (format, key) in targets.iter() {
        match fetch_one(storage, folder, key).await {
            Ok(path) => {
                tracing::info!(
                    format = %format,
                    path = %path.display(),
                    "Fetched output artifact"
                );
                report.fetched.push((format, path));
            }
            Err(e) => {
                tracing::error!(
                    format = %format,
                    key = %key,
                    error = %e,
                    "Failed to fetch output artifact"
                );
                report.failed.push((format, e));
            }
        }
    }

    report
}

async fn fetch_one(
    storage: &dyn Storage,
    folder: &Path,
    key: &str,
) -> Result<PathBuf, StorageError> {
    let data = storage.get(key).await?;
    let path = folder.join(key);
    tokio::fs::write(&path, &data).await.map_err(|e| {
        StorageError::DownloadFailed(format!("Failed to write {}: {}", path.display(), e))
    })?;
    Ok(path)
}
