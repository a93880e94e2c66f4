//! End-to-end workflow tests over local storage and a scripted orchestrator.
//!
//! Run with: `cargo test -p verbatim-workflow --test workflow_test`

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use verbatim_client::{OrchestratorApi, OrchestratorError, OrchestratorResult};
use verbatim_core::models::{AccessToken, JobEnvelope, JobStatus, RemoteJob};
use verbatim_core::{Config, StorageBackend};
use verbatim_storage::{create_storage, Storage, StorageError, StorageResult};
use verbatim_workflow::{Workflow, WorkflowError};

const INPUT_BYTES: &[u8] = b"fake mp4 payload";

fn test_config(media_dir: &Path, storage_dir: &Path) -> Config {
    Config {
        orchestrator_url: "http://localhost:3000".to_string(),
        client_key: "key-1".to_string(),
        client_secret: "secret-1".to_string(),
        project_service_id: "project-1".to_string(),
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        aws_access_key_id: None,
        aws_secret_access_key: None,
        aws_session_token: None,
        local_storage_path: Some(storage_dir.to_string_lossy().into_owned()),
        local_storage_base_url: Some("http://localhost:8080/files".to_string()),
        media_folder: media_dir.to_path_buf(),
        input_file: "video.mp4".to_string(),
        input_duration_secs: 30,
        output_json: "r.json".to_string(),
        output_ttml: "r.ttml".to_string(),
        output_text: "r.txt".to_string(),
        read_grant_ttl_secs: 900,
        write_grant_ttl_secs: 3600,
        poll_interval_secs: 30,
        poll_deadline_secs: 7200,
        http_timeout_secs: 60,
    }
}

/// Counts delete calls on the way through to the real backend.
struct CountingStorage {
    inner: Arc<dyn Storage>,
    deletes: Mutex<Vec<String>>,
}

impl CountingStorage {
    fn new(inner: Arc<dyn Storage>) -> Self {
        Self {
            inner,
            deletes: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Storage for CountingStorage {
    async fn put(&self, storage_key: &str, data: Vec<u8>) -> StorageResult<()> {
        self.inner.put(storage_key, data).await
    }

    async fn get(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.inner.get(storage_key).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.deletes.lock().unwrap().push(storage_key.to_string());
        self.inner.delete(storage_key).await
    }

    async fn signed_get_url(
        &self,
        storage_key: &str,
        expires_in: std::time::Duration,
    ) -> StorageResult<String> {
        self.inner.signed_get_url(storage_key, expires_in).await
    }

    async fn signed_put_url(
        &self,
        storage_key: &str,
        content_type: Option<&str>,
        expires_in: std::time::Duration,
    ) -> StorageResult<String> {
        self.inner
            .signed_put_url(storage_key, content_type, expires_in)
            .await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.exists(storage_key).await
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}

/// Refuses to delete one key; everything else passes through.
struct GrudgingStorage {
    inner: Arc<dyn Storage>,
    refused: String,
}

#[async_trait]
impl Storage for GrudgingStorage {
    async fn put(&self, storage_key: &str, data: Vec<u8>) -> StorageResult<()> {
        self.inner.put(storage_key, data).await
    }

    async fn get(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.inner.get(storage_key).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        if storage_key == self.refused {
            return Err(StorageError::DeleteFailed(format!(
                "refusing to delete {}",
                storage_key
            )));
        }
        self.inner.delete(storage_key).await
    }

    async fn signed_get_url(
        &self,
        storage_key: &str,
        expires_in: std::time::Duration,
    ) -> StorageResult<String> {
        self.inner.signed_get_url(storage_key, expires_in).await
    }

    async fn signed_put_url(
        &self,
        storage_key: &str,
        content_type: Option<&str>,
        expires_in: std::time::Duration,
    ) -> StorageResult<String> {
        self.inner
            .signed_put_url(storage_key, content_type, expires_in)
            .await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.exists(storage_key).await
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}

/// Scripted orchestrator: replays status ticks and plays the remote worker,
/// writing output artifacts into storage as the job completes.
struct FakeOrchestrator {
    reject_auth: bool,
    script: Mutex<VecDeque<OrchestratorResult<JobStatus>>>,
    storage: Arc<dyn Storage>,
    output_keys: Vec<String>,
    auth_calls: Mutex<u32>,
    submitted: Mutex<Vec<JobEnvelope>>,
}

impl FakeOrchestrator {
    fn new(
        storage: Arc<dyn Storage>,
        output_keys: &[&str],
        script: Vec<OrchestratorResult<JobStatus>>,
    ) -> Self {
        Self {
            reject_auth: false,
            script: Mutex::new(script.into_iter().collect()),
            storage,
            output_keys: output_keys.iter().map(|k| k.to_string()).collect(),
            auth_calls: Mutex::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    fn rejecting_auth(storage: Arc<dyn Storage>) -> Self {
        let mut fake = Self::new(storage, &[], Vec::new());
        fake.reject_auth = true;
        fake
    }

    fn auth_calls(&self) -> u32 {
        *self.auth_calls.lock().unwrap()
    }

    fn submitted_envelopes(&self) -> Vec<JobEnvelope> {
        self.submitted.lock().unwrap().clone()
    }

    async fn write_outputs(&self) {
        for key in &self.output_keys {
            self.storage
                .put(key, format!("transcript {}", key).into_bytes())
                .await
                .unwrap();
        }
    }
}

#[async_trait]
impl OrchestratorApi for FakeOrchestrator {
    async fn authenticate(
        &self,
        _client_key: &str,
        _client_secret: &str,
    ) -> OrchestratorResult<AccessToken> {
        *self.auth_calls.lock().unwrap() += 1;
        if self.reject_auth {
            return Err(OrchestratorError::Auth(
                "401 Unauthorized - invalid client credentials".to_string(),
            ));
        }
        Ok(AccessToken::new("fake-token"))
    }

    async fn create_job(
        &self,
        envelope: &JobEnvelope,
        _token: &AccessToken,
    ) -> OrchestratorResult<RemoteJob> {
        self.submitted.lock().unwrap().push(envelope.clone());
        Ok(RemoteJob {
            id: "job-1".to_string(),
            status: JobStatus::Pending,
        })
    }

    async fn get_job(&self, job_id: &str, _token: &AccessToken) -> OrchestratorResult<RemoteJob> {
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(JobStatus::Running));
        let status = next?;
        if status == JobStatus::Completed {
            self.write_outputs().await;
        }
        Ok(RemoteJob {
            id: job_id.to_string(),
            status,
        })
    }
}

struct TestRig {
    _media_dir: tempfile::TempDir,
    _storage_dir: tempfile::TempDir,
    config: Config,
    storage: Arc<dyn Storage>,
}

async fn setup_rig() -> TestRig {
    let media_dir = tempfile::tempdir().unwrap();
    let storage_dir = tempfile::tempdir().unwrap();
    std::fs::write(media_dir.path().join("video.mp4"), INPUT_BYTES).unwrap();

    let config = test_config(media_dir.path(), storage_dir.path());
    let storage = create_storage(&config).await.unwrap();

    TestRig {
        _media_dir: media_dir,
        _storage_dir: storage_dir,
        config,
        storage,
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_run_fetches_outputs_and_leaves_storage_empty() {
    let rig = setup_rig().await;
    let counting = Arc::new(CountingStorage::new(rig.storage.clone()));
    let storage: Arc<dyn Storage> = counting.clone();

    let orchestrator = Arc::new(FakeOrchestrator::new(
        storage.clone(),
        &["r.json", "r.ttml", "r.txt"],
        vec![
            Ok(JobStatus::Running),
            Ok(JobStatus::Running),
            Ok(JobStatus::Completed),
        ],
    ));

    let media_folder = rig.config.media_folder.clone();
    let workflow = Workflow::new(rig.config, storage.clone(), orchestrator.clone());
    let report = workflow.run().await.unwrap();

    assert!(report.succeeded());
    assert_eq!(report.job.id, "job-1");
    assert_eq!(report.job.status, JobStatus::Completed);
    assert_eq!(report.fetch.fetched.len(), 3);
    assert_eq!(report.cleanup.deleted.len(), 4);
    assert!(report.cleanup.is_clean());
    assert!(report.finished_at >= report.started_at);

    // Authenticated exactly once; one envelope referencing all four grants.
    assert_eq!(orchestrator.auth_calls(), 1);
    let submitted = orchestrator.submitted_envelopes();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].quantity, 30);
    assert_eq!(submitted[0].locators().count(), 4);
    assert!(submitted[0].validate().is_ok());
    assert_eq!(submitted[0].job.input.bucket, "local");
    assert_eq!(
        submitted[0].job.input.access_url.as_deref(),
        Some("http://localhost:8080/files/video.mp4")
    );

    // Transcripts landed in the media folder next to the input.
    let json = std::fs::read_to_string(media_folder.join("r.json")).unwrap();
    assert_eq!(json, "transcript r.json");
    assert!(media_folder.join("r.ttml").exists());
    assert!(media_folder.join("r.txt").exists());

    // Exactly four deletes, and nothing left in the bucket.
    assert_eq!(counting.deletes.lock().unwrap().len(), 4);
    for key in ["video.mp4", "r.json", "r.ttml", "r.txt"] {
        assert!(!storage.exists(key).await.unwrap());
    }
}

#[tokio::test(start_paused = true)]
async fn test_auth_failure_still_reaps_the_staged_input() {
    let rig = setup_rig().await;
    let counting = Arc::new(CountingStorage::new(rig.storage.clone()));
    let storage: Arc<dyn Storage> = counting.clone();

    let orchestrator = Arc::new(FakeOrchestrator::rejecting_auth(storage.clone()));

    let workflow = Workflow::new(rig.config, storage.clone(), orchestrator.clone());
    let err = workflow.run().await.unwrap_err();

    match err {
        WorkflowError::Orchestrator(OrchestratorError::Auth(msg)) => {
            assert!(msg.contains("401"));
        }
        other => panic!("expected an auth error, got {:?}", other),
    }

    // No job was submitted, yet cleanup still made all four delete calls
    // and the staged input is gone.
    assert!(orchestrator.submitted_envelopes().is_empty());
    assert_eq!(counting.deletes.lock().unwrap().len(), 4);
    assert!(!storage.exists("video.mp4").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_failed_job_reports_failure_without_raising() {
    let rig = setup_rig().await;
    let storage = rig.storage.clone();

    // The job fails remotely; no outputs are ever written.
    let orchestrator = Arc::new(FakeOrchestrator::new(
        storage.clone(),
        &[],
        vec![Ok(JobStatus::Running), Ok(JobStatus::Failed)],
    ));

    let workflow = Workflow::new(rig.config, storage.clone(), orchestrator);
    let report = workflow.run().await.unwrap();

    assert!(!report.succeeded());
    assert_eq!(report.job.status, JobStatus::Failed);
    // All three fetches were attempted and came back empty-handed.
    assert_eq!(report.fetch.fetched.len(), 0);
    assert_eq!(report.fetch.failed.len(), 3);
    // The staged input was still reaped.
    assert!(!storage.exists("video.mp4").await.unwrap());
    assert_eq!(report.cleanup.deleted.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_mid_poll_rejection_fails_the_run_but_cleans_up() {
    let rig = setup_rig().await;
    let counting = Arc::new(CountingStorage::new(rig.storage.clone()));
    let storage: Arc<dyn Storage> = counting.clone();

    let orchestrator = Arc::new(FakeOrchestrator::new(
        storage.clone(),
        &[],
        vec![
            Ok(JobStatus::Running),
            Err(OrchestratorError::Poll(
                "401 Unauthorized - token expired".to_string(),
            )),
        ],
    ));

    let workflow = Workflow::new(rig.config, storage.clone(), orchestrator);
    let err = workflow.run().await.unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Orchestrator(OrchestratorError::Poll(_))
    ));
    assert_eq!(counting.deletes.lock().unwrap().len(), 4);
    assert!(!storage.exists("video.mp4").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_partial_cleanup_is_reported_not_fatal() {
    let rig = setup_rig().await;
    let storage: Arc<dyn Storage> = Arc::new(GrudgingStorage {
        inner: rig.storage.clone(),
        refused: "r.ttml".to_string(),
    });

    let orchestrator = Arc::new(FakeOrchestrator::new(
        storage.clone(),
        &["r.json", "r.ttml", "r.txt"],
        vec![Ok(JobStatus::Completed)],
    ));

    let workflow = Workflow::new(rig.config, storage.clone(), orchestrator);
    let report = workflow.run().await.unwrap();

    // The run itself succeeded; the leftover object is reported.
    assert!(report.succeeded());
    assert!(!report.cleanup.is_clean());
    assert_eq!(report.cleanup.deleted.len(), 3);
    assert_eq!(report.cleanup.failed.len(), 1);
    assert_eq!(report.cleanup.failed[0].0, "r.ttml");
    assert!(storage.exists("r.ttml").await.unwrap());
    assert!(!storage.exists("video.mp4").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_missing_input_file_fails_before_any_remote_call() {
    let media_dir = tempfile::tempdir().unwrap();
    let storage_dir = tempfile::tempdir().unwrap();
    // No video.mp4 is written.

    let config = test_config(media_dir.path(), storage_dir.path());
    let inner = create_storage(&config).await.unwrap();
    let counting = Arc::new(CountingStorage::new(inner));
    let storage: Arc<dyn Storage> = counting.clone();

    let orchestrator = Arc::new(FakeOrchestrator::new(storage.clone(), &[], Vec::new()));

    let workflow = Workflow::new(config, storage, orchestrator.clone());
    let err = workflow.run().await.unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Storage(StorageError::UploadFailed(_))
    ));
    // Nothing was staged, so nothing is reaped and nobody is called.
    assert_eq!(orchestrator.auth_calls(), 0);
    assert!(orchestrator.submitted_envelopes().is_empty());
    assert!(counting.deletes.lock().unwrap().is_empty());
}
