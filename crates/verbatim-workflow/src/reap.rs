//! Staged artifact cleanup.

use std::sync::Arc;

use tokio::task::JoinSet;

use verbatim_storage::{Storage, StorageError, StorageResult};

/// Outcome of the cleanup fan-out. Failures are recorded per object and
/// never interrupt the other deletes.
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, StorageError)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Deletes every staged object, all issued concurrently and jointly awaited.
///
/// One delete per key, regardless of whether the run ever wrote the object;
/// backends treat deleting an absent key as success.
pub async fn reap_artifacts(storage: &Arc<dyn Storage>, keys: &[String]) -> CleanupReport {
    let mut join_set = JoinSet::new();

    for (idx, key) in keys.iter().enumerate() {
        let storage = Arc::clone(storage);
        let key = key.clone();
        join_set.spawn(async move {
            let result = storage.delete(&key).await;
            (idx, key, result)
        });
    }

    let mut outcomes: Vec<Option<(String, StorageResult<()>)>> =
        (0..keys.len()).map(|_| None).collect();

    while let Some(join_result) = join_set.join_next().await {
        match join_result {
            Ok((idx, key, result)) => outcomes[idx] = Some((key, result)),
            Err(e) => {
                tracing::error!("Cleanup task panicked: {}", e);
            }
        }
    }

    let mut report = CleanupReport::default();
    for outcome in outcomes.into_iter().flatten() {
        match outcome {
            (key, Ok(())) => {
                tracing::info!(key = %key, "Deleted staged object");
                report.deleted.push(key);
            }
            (key, Err(e)) => {
                tracing::error!(key = %key, error = %e, "Failed to delete staged object");
                report.failed.push((key, e));
            }
        }
    }

    report
}
