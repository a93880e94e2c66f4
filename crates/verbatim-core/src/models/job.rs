use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::asset::MediaAsset;
use super::locator::{GrantSet, OutputTargets, StorageLocator};

/// Artifact formats produced by a transcription job.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Json,
    Ttml,
    Text,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Json, OutputFormat::Ttml, OutputFormat::Text];

    /// Content type declared on the write grant, where one applies.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Json => Some("application/json"),
            OutputFormat::Ttml | OutputFormat::Text => None,
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Ttml => write!(f, "ttml"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "ttml" => Ok(OutputFormat::Ttml),
            "text" => Ok(OutputFormat::Text),
            _ => Err(anyhow::anyhow!("Invalid output format: {}", s)),
        }
    }
}

/// Job categories understood by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    AiTranscription,
}

/// Processing profiles within a job category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobProfile {
    SpeechToText,
}

/// What the remote worker is asked to do: fixed transcription taxonomy, one
/// input locator, one output locator per format. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescription {
    pub job_type: JobType,
    pub job_profile: JobProfile,
    pub input: StorageLocator,
    pub outputs: BTreeMap<OutputFormat, StorageLocator>,
}

/// The unit of submission: billing scope, billable quantity, and the job
/// description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEnvelope {
    pub project_service_id: String,
    pub quantity: u32,
    pub job: JobDescription,
}

impl JobEnvelope {
    /// Builds the envelope for one staged asset. Pure: identical inputs
    /// always produce an identical envelope, and nothing is read from the
    /// environment or the network.
    pub fn build(
        project_service_id: &str,
        asset: &MediaAsset,
        bucket: &str,
        targets: &OutputTargets,
        grants: &GrantSet,
    ) -> JobEnvelope {
        let input =
            StorageLocator::new(bucket, asset.storage_key()).with_access_url(&grants.input_url);

        let mut outputs = BTreeMap::new();
        for (format, key) in targets.iter() {
            let locator =
                StorageLocator::new(bucket, key).with_access_url(grants.output_url(format));
            outputs.insert(format, locator);
        }

        JobEnvelope {
            project_service_id: project_service_id.to_string(),
            quantity: asset.duration_secs,
            job: JobDescription {
                job_type: JobType::AiTranscription,
                job_profile: JobProfile::SpeechToText,
                input,
                outputs,
            },
        }
    }

    /// All locators referenced by the envelope, input first.
    pub fn locators(&self) -> impl Iterator<Item = &StorageLocator> {
        std::iter::once(&self.job.input).chain(self.job.outputs.values())
    }

    /// Rejects an envelope with a locator that is missing its access grant.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        for locator in self.locators() {
            if !locator.has_access_url() {
                return Err(anyhow::anyhow!(
                    "Locator for '{}' is missing an access grant",
                    locator.key
                ));
            }
        }
        Ok(())
    }
}

/// Remote job lifecycle states. Statuses the orchestrator reports beyond
/// the known set deserialize as `Unknown` and count as in-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Queued,
    Scheduled,
    Running,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Completed and Failed are the only states a job never leaves.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Scheduled => write!(f, "scheduled"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "queued" => Ok(JobStatus::Queued),
            "scheduled" => Ok(JobStatus::Scheduled),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            // Unrecognized statuses are in-flight states of a newer
            // orchestrator, not errors.
            _ => Ok(JobStatus::Unknown),
        }
    }
}

/// Orchestrator-side handle for a submitted job. The id is assigned at
/// submission and never rewritten locally; the status only changes by
/// re-fetching the handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteJob {
    pub id: String,
    pub status: JobStatus,
}

impl RemoteJob {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
