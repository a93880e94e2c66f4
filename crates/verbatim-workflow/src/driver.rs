//! Workflow driver.
//!
//! Runs the one-shot pipeline: stage the input, issue grants, build and
//! submit the job envelope, poll to a terminal status, fetch the outputs,
//! and reap every staged object before reporting.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use verbatim_client::{wait_for_completion, OrchestratorApi, PollConfig};
use verbatim_core::models::{JobEnvelope, JobStatus, MediaAsset, OutputTargets, RemoteJob};
use verbatim_core::Config;
use verbatim_storage::Storage;

use crate::error::{WorkflowError, WorkflowResult};
use crate::fetch::{fetch_results, FetchReport};
use crate::grants::issue_grants;
use crate::reap::{reap_artifacts, CleanupReport};
use crate::stage::stage_input;

/// Summary of one finished run.
#[derive(Debug)]
pub struct WorkflowReport {
    pub run_id: Uuid,
    pub job: RemoteJob,
    pub fetch: FetchReport,
    pub cleanup: CleanupReport,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl WorkflowReport {
    /// True only when the job completed and every artifact landed locally.
    pub fn succeeded(&self) -> bool {
        self.job.status == JobStatus::Completed && self.fetch.is_complete()
    }
}

/// One-shot transcription workflow over a storage backend and an
/// orchestrator client.
pub struct Workflow {
    config: Config,
    storage: Arc<dyn Storage>,
    orchestrator: Arc<dyn OrchestratorApi>,
}

impl Workflow {
    pub fn new(
        config: Config,
        storage: Arc<dyn Storage>,
        orchestrator: Arc<dyn OrchestratorApi>,
    ) -> Self {
        Self {
            config,
            storage,
            orchestrator,
        }
    }

    /// Runs the pipeline end to end and returns what happened.
    ///
    /// Stages short-circuit on the first failure. Once the input is staged,
    /// the reaper runs on every outcome before this returns, success or not;
    /// only a staging failure skips it, since nothing was written remotely.
    /// A `Failed` terminal status is an `Ok` report, not an error.
    #[tracing::instrument(
        skip(self),
        fields(
            input = %self.config.input_file,
            backend = %self.storage.backend_type()
        )
    )]
    pub async fn run(&self) -> WorkflowResult<WorkflowReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let asset = self.config.asset();
        let targets = self.config.output_targets();

        tracing::info!(run_id = %run_id, "Starting transcription workflow");

        stage_input(self.storage.as_ref(), &asset).await?;

        let outcome = self.run_staged(&asset, &targets).await;

        // The staged input and any partial outputs are removed however the
        // submitted leg went.
        let keys = staged_keys(&asset, &targets);
        let cleanup = reap_artifacts(&self.storage, &keys).await;
        if !cleanup.is_clean() {
            tracing::warn!(
                run_id = %run_id,
                failed = cleanup.failed.len(),
                "Cleanup left staged objects behind"
            );
        }

        let (job, mut fetch) = outcome?;

        // A completed job with missing artifacts is a failed run; the first
        // download error speaks for it. A failed job keeps its report since
        // absent outputs are expected there.
        if job.status == JobStatus::Completed && !fetch.failed.is_empty() {
            let (format, error) = fetch.failed.remove(0);
            tracing::error!(
                run_id = %run_id,
                format = %format,
                "Completed job is missing a fetched artifact"
            );
            return Err(WorkflowError::Storage(error));
        }

        let finished_at = Utc::now();
        let report = WorkflowReport {
            run_id,
            job,
            fetch,
            cleanup,
            started_at,
            finished_at,
        };

        tracing::info!(
            run_id = %run_id,
            job_id = %report.job.id,
            status = %report.job.status,
            fetched = report.fetch.fetched.len(),
            deleted = report.cleanup.deleted.len(),
            "Workflow finished"
        );
        Ok(report)
    }

    async fn run_staged(
        &self,
        asset: &MediaAsset,
        targets: &OutputTargets,
    ) -> WorkflowResult<(RemoteJob, FetchReport)> {
        let grants = issue_grants(
            self.storage.as_ref(),
            asset,
            targets,
            self.config.read_grant_ttl(),
            self.config.write_grant_ttl(),
        )
        .await?;

        let envelope = JobEnvelope::build(
            &self.config.project_service_id,
            asset,
            self.config.bucket_label(),
            targets,
            &grants,
        );

        let token = self
            .orchestrator
            .authenticate(&self.config.client_key, &self.config.client_secret)
            .await?;

        let job = self.orchestrator.create_job(&envelope, &token).await?;

        let poll = PollConfig::new(self.config.poll_interval(), self.config.poll_deadline());
        let job = wait_for_completion(self.orchestrator.as_ref(), &token, job, &poll).await?;

        if job.status == JobStatus::Failed {
            tracing::error!(job_id = %job.id, "Transcription job failed remotely");
        }

        // Outputs are fetched whatever the terminal status; a failed job
        // usually has none, and those misses land in the report.
        let fetch = fetch_results(self.storage.as_ref(), &self.config.media_folder, targets).await;
        Ok((job, fetch))
    }
}

/// The four keys a run may leave in the bucket: the staged input plus one
/// per output format.
fn staged_keys(asset: &MediaAsset, targets: &OutputTargets) -> Vec<String> {
    let mut keys = vec![asset.storage_key().to_string()];
    keys.extend(targets.iter().map(|(_, key)| key.to_string()));
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staged_keys_cover_input_and_outputs() {
        let asset = MediaAsset::new("/media", "video.mp4", 30);
        let targets = OutputTargets {
            json: "r.json".to_string(),
            ttml: "r.ttml".to_string(),
            text: "r.txt".to_string(),
        };

        let keys = staged_keys(&asset, &targets);
        assert_eq!(keys, ["video.mp4", "r.json", "r.ttml", "r.txt"]);
    }
}
