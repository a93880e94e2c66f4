use thiserror::Error;

use verbatim_core::models::JobStatus;

/// Errors surfaced by orchestrator calls and the status poll loop.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Job submission failed: {0}")]
    Submission(String),

    #[error("Status fetch failed: {0}")]
    Poll(String),

    #[error("Job still {last_status} when the polling deadline expired after {attempts} status checks")]
    DeadlineExceeded { attempts: u32, last_status: JobStatus },

    #[error("Client configuration error: {0}")]
    Config(String),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
