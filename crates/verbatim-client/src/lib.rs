//! Shared HTTP client for the transcription orchestrator.
//!
//! Provides a minimal client with bearer-token auth, domain methods
//! (authenticate, submit job, fetch status), and a fixed-interval poll loop.
//! The workflow crate drives everything through the [`api::OrchestratorApi`]
//! trait so orchestrator behavior can be scripted in tests.

pub mod api;
pub mod error;
pub mod poll;

use std::time::Duration;

use reqwest::Client;

/// HTTP client for the orchestrator REST API.
///
/// Holds no session state. The bearer token is passed explicitly on every
/// authenticated call, which keeps the client freely shareable across tasks.
#[derive(Clone, Debug)]
pub struct OrchestratorClient {
    client: Client,
    base_url: String,
}

impl OrchestratorClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> OrchestratorResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            OrchestratorError::Config(format!("Failed to create HTTP client: {}", e))
        })?;

        let base_url = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(
        &self,
        request: reqwest::RequestBuilder,
        token: &AccessToken,
    ) -> reqwest::RequestBuilder {
        request.header("Authorization", format!("Bearer {}", token.authorization))
    }
}

// Re-export the API surface and the wire types callers hand back and forth.
pub use api::OrchestratorApi;
pub use error::{OrchestratorError, OrchestratorResult};
pub use poll::{wait_for_completion, PollConfig};
pub use verbatim_core::models::{AccessToken, JobEnvelope, JobStatus, RemoteJob};
