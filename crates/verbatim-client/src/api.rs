//! Orchestrator API surface.
//!
//! [`OrchestratorApi`] is the seam the workflow drives; [`OrchestratorClient`]
//! is its HTTP implementation against the orchestrator's REST endpoints.

use async_trait::async_trait;
use serde::Serialize;

use verbatim_core::models::{AccessToken, JobEnvelope, RemoteJob};

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::OrchestratorClient;

/// Calls the workflow makes against the orchestrator.
#[async_trait]
pub trait OrchestratorApi: Send + Sync {
    /// Exchanges service credentials for a bearer token. Called once per run;
    /// there is no refresh path.
    async fn authenticate(
        &self,
        client_key: &str,
        client_secret: &str,
    ) -> OrchestratorResult<AccessToken>;

    /// Submits a job envelope and returns the orchestrator's handle for it.
    async fn create_job(
        &self,
        envelope: &JobEnvelope,
        token: &AccessToken,
    ) -> OrchestratorResult<RemoteJob>;

    /// Fetches the current status of a submitted job.
    async fn get_job(&self, job_id: &str, token: &AccessToken) -> OrchestratorResult<RemoteJob>;
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_key: &'a str,
    client_secret: &'a str,
}

#[async_trait]
impl OrchestratorApi for OrchestratorClient {
    async fn authenticate(
        &self,
        client_key: &str,
        client_secret: &str,
    ) -> OrchestratorResult<AccessToken> {
        let url = self.build_url("/api/auth/token");
        let body = TokenRequest {
            client_key,
            client_secret,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| OrchestratorError::Auth(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(OrchestratorError::Auth(format!(
                "{} - {}",
                status, error_text
            )));
        }

        let token: AccessToken = response.json().await.map_err(|e| {
            OrchestratorError::Auth(format!("Failed to parse token response: {}", e))
        })?;

        tracing::debug!("Obtained orchestrator bearer token");
        Ok(token)
    }

    async fn create_job(
        &self,
        envelope: &JobEnvelope,
        token: &AccessToken,
    ) -> OrchestratorResult<RemoteJob> {
        // An envelope with a grantless locator is rejected locally rather
        // than bounced off the orchestrator.
        envelope
            .validate()
            .map_err(|e| OrchestratorError::Submission(e.to_string()))?;

        let url = self.build_url("/api/jobs");
        let request = self.client.post(&url).json(envelope);
        let request = self.bearer(request, token);

        let response = request
            .send()
            .await
            .map_err(|e| OrchestratorError::Submission(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(OrchestratorError::Submission(format!(
                "{} - {}",
                status, error_text
            )));
        }

        let job: RemoteJob = response.json().await.map_err(|e| {
            OrchestratorError::Submission(format!("Failed to parse job response: {}", e))
        })?;

        tracing::info!(job_id = %job.id, status = %job.status, "Job submitted");
        Ok(job)
    }

    async fn get_job(&self, job_id: &str, token: &AccessToken) -> OrchestratorResult<RemoteJob> {
        let url = self.build_url(&format!("/api/jobs/{}", job_id));
        let request = self.client.get(&url);
        let request = self.bearer(request, token);

        let response = request
            .send()
            .await
            .map_err(|e| OrchestratorError::Poll(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(OrchestratorError::Poll(format!(
                "{} - {}",
                status, error_text
            )));
        }

        let job: RemoteJob = response
            .json()
            .await
            .map_err(|e| OrchestratorError::Poll(format!("Failed to parse job response: {}", e)))?;

        Ok(job)
    }
}
