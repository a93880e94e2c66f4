//! One-shot transcription workflow.
//!
//! Stages a local media file into object storage, asks the orchestrator to
//! transcribe it, polls the job to a terminal status, downloads the output
//! artifacts, and removes every staged object afterwards.

pub mod driver;
pub mod error;
pub mod fetch;
pub mod grants;
pub mod reap;
pub mod stage;

pub use driver::{Workflow, WorkflowReport};
pub use error::{WorkflowError, WorkflowResult};
pub use fetch::{fetch_results, FetchReport};
pub use grants::issue_grants;
pub use reap::{reap_artifacts, CleanupReport};
pub use stage::stage_input;
