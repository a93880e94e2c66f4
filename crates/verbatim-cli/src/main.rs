//! Verbatim CLI — one-shot media transcription runs.
//!
//! Reads configuration from the environment (and a `.env` file when
//! present), stages the configured input, drives the orchestrator job to a
//! terminal status, and fetches the transcripts next to the input file.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use verbatim_cli::init_tracing;
use verbatim_client::OrchestratorClient;
use verbatim_core::Config;
use verbatim_storage::create_storage;
use verbatim_workflow::{Workflow, WorkflowReport};

#[derive(Parser)]
#[command(name = "verbatim", about = "One-shot media transcription workflow")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage the configured input, run the transcription job, fetch results
    Run,
    /// Load and validate configuration, then print a redacted summary
    CheckConfig,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

fn report_summary(report: &WorkflowReport) -> serde_json::Value {
    serde_json::json!({
        "run_id": report.run_id.to_string(),
        "job_id": report.job.id,
        "job_status": report.job.status.to_string(),
        "fetched": report.fetch.fetched.iter()
            .map(|(format, path)| serde_json::json!({
                "format": format.to_string(),
                "path": path.display().to_string(),
            }))
            .collect::<Vec<_>>(),
        "fetch_failures": report.fetch.failed.iter()
            .map(|(format, error)| serde_json::json!({
                "format": format.to_string(),
                "error": error.to_string(),
            }))
            .collect::<Vec<_>>(),
        "cleanup": {
            "deleted": report.cleanup.deleted,
            "failed": report.cleanup.failed.iter()
                .map(|(key, error)| serde_json::json!({
                    "key": key,
                    "error": error.to_string(),
                }))
                .collect::<Vec<_>>(),
        },
        "started_at": report.started_at.to_rfc3339(),
        "finished_at": report.finished_at.to_rfc3339(),
        "succeeded": report.succeeded(),
    })
}

// Secrets stay out of the summary; only addressing and tuning are shown.
fn config_summary(config: &Config) -> serde_json::Value {
    serde_json::json!({
        "orchestrator_url": config.orchestrator_url,
        "storage_backend": config.storage_backend.to_string(),
        "bucket": config.bucket_label(),
        "media_folder": config.media_folder.display().to_string(),
        "input_file": config.input_file,
        "input_duration_secs": config.input_duration_secs,
        "outputs": [config.output_json, config.output_ttml, config.output_text],
        "read_grant_ttl_secs": config.read_grant_ttl_secs,
        "write_grant_ttl_secs": config.write_grant_ttl_secs,
        "poll_interval_secs": config.poll_interval_secs,
        "poll_deadline_secs": config.poll_deadline_secs,
    })
}

async fn run_workflow() -> anyhow::Result<()> {
    let config = Config::from_env().context(
        "Failed to load configuration. Set ORCHESTRATOR_URL, CLIENT_KEY, CLIENT_SECRET, \
         PROJECT_SERVICE_ID and the storage variables",
    )?;

    let storage = create_storage(&config)
        .await
        .context("Failed to create storage backend")?;

    let client = OrchestratorClient::new(config.orchestrator_url.clone(), config.http_timeout())
        .context("Failed to create orchestrator client")?;

    let workflow = Workflow::new(config, storage, Arc::new(client));
    let report = workflow.run().await?;

    print_json(&report_summary(&report))?;

    if !report.succeeded() {
        anyhow::bail!(
            "Run did not succeed: job {} ended {}",
            report.job.id,
            report.job.status
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run_workflow().await?,
        Commands::CheckConfig => {
            let config = Config::from_env().context("Failed to load configuration")?;
            print_json(&config_summary(&config))?;
        }
    }

    Ok(())
}
