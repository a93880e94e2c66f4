use thiserror::Error;

use verbatim_client::OrchestratorError;
use verbatim_storage::StorageError;

/// A run fails with the error of whichever step gave out first.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
