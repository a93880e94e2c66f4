//! Fixed-interval status polling.

use std::time::Duration;

use tokio::time::{sleep, Instant};

use verbatim_core::models::{AccessToken, RemoteJob};

use crate::api::OrchestratorApi;
use crate::error::{OrchestratorError, OrchestratorResult};

/// Pacing for the status poll loop.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Delay between consecutive status fetches.
    pub interval: Duration,
    /// Overall budget for reaching a terminal status. `None` polls forever.
    pub deadline: Option<Duration>,
}

impl PollConfig {
    pub fn new(interval: Duration, deadline: Option<Duration>) -> Self {
        Self { interval, deadline }
    }
}

/// Polls the job until it reports a terminal status.
///
/// Fetches are strictly sequential, one per interval, never overlapping. A
/// job that is already terminal returns immediately without a fetch. A
/// `Failed` terminal status is a successful poll result; the caller decides
/// what to do with it.
pub async fn wait_for_completion(
    api: &dyn OrchestratorApi,
    token: &AccessToken,
    job: RemoteJob,
    config: &PollConfig,
) -> OrchestratorResult<RemoteJob> {
    let started = Instant::now();
    let mut current = job;
    let mut attempts: u32 = 0;

    loop {
        if current.is_terminal() {
            tracing::info!(
                job_id = %current.id,
                status = %current.status,
                attempts = attempts,
                "Job reached terminal status"
            );
            return Ok(current);
        }

        if let Some(deadline) = config.deadline {
            if started.elapsed() >= deadline {
                return Err(OrchestratorError::DeadlineExceeded {
                    attempts,
                    last_status: current.status,
                });
            }
        }

        sleep(config.interval).await;

        let fetched = api.get_job(&current.id, token).await?;
        if fetched.id != current.id {
            return Err(OrchestratorError::Poll(format!(
                "Orchestrator returned job '{}' while polling job '{}'",
                fetched.id, current.id
            )));
        }

        attempts += 1;
        tracing::debug!(
            job_id = %fetched.id,
            status = %fetched.status,
            attempt = attempts,
            "Polled job status"
        );
        current = fetched;
    }
}
