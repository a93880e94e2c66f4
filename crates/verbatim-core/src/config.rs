//! Configuration module
//!
//! One `Config` is built from the environment at startup and passed by
//! reference into every component; nothing reads configuration ambiently
//! after that.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::{MediaAsset, OutputTargets};
use crate::storage_types::StorageBackend;

// Common constants
const INPUT_DURATION_SECS: u32 = 30;
const READ_GRANT_TTL_SECS: u64 = 900;
const WRITE_GRANT_TTL_SECS: u64 = 3600;
const POLL_INTERVAL_SECS: u64 = 30;
const POLL_DEADLINE_SECS: u64 = 7200;
const HTTP_TIMEOUT_SECS: u64 = 60;

/// Workflow configuration
#[derive(Clone, Debug)]
pub struct Config {
    // Remote orchestrator
    pub orchestrator_url: String,
    pub client_key: String,
    pub client_secret: String,
    pub project_service_id: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub aws_region: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_session_token: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Input media
    pub media_folder: PathBuf,
    pub input_file: String,
    /// Declared duration of the input in seconds; reported to the
    /// orchestrator as the billable quantity.
    pub input_duration_secs: u32,
    // Output artifact file names (also used as storage keys)
    pub output_json: String,
    pub output_ttml: String,
    pub output_text: String,
    // Access grant lifetimes
    pub read_grant_ttl_secs: u64,
    pub write_grant_ttl_secs: u64,
    // Status polling
    pub poll_interval_secs: u64,
    /// Overall polling deadline in seconds. 0 = unbounded.
    pub poll_deadline_secs: u64,
    // HTTP client
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .and_then(|s| match s.to_lowercase().as_str() {
                "s3" => Some(StorageBackend::S3),
                "local" => Some(StorageBackend::Local),
                _ => None,
            })
            .unwrap_or(StorageBackend::S3);

        let config = Config {
            orchestrator_url: env::var("ORCHESTRATOR_URL")
                .map_err(|_| anyhow::anyhow!("ORCHESTRATOR_URL must be set"))?,
            client_key: env::var("CLIENT_KEY")
                .map_err(|_| anyhow::anyhow!("CLIENT_KEY must be set for authentication"))?,
            client_secret: env::var("CLIENT_SECRET")
                .map_err(|_| anyhow::anyhow!("CLIENT_SECRET must be set for authentication"))?,
            project_service_id: env::var("PROJECT_SERVICE_ID")
                .map_err(|_| anyhow::anyhow!("PROJECT_SERVICE_ID must be set"))?,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            aws_access_key_id: env::var("AWS_ACCESS_KEY_ID").ok(),
            aws_secret_access_key: env::var("AWS_SECRET_ACCESS_KEY").ok(),
            aws_session_token: env::var("AWS_SESSION_TOKEN").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            media_folder: env::var("MEDIA_FOLDER")
                .map_err(|_| anyhow::anyhow!("MEDIA_FOLDER must be set"))?
                .into(),
            input_file: env::var("INPUT_FILE")
                .map_err(|_| anyhow::anyhow!("INPUT_FILE must be set"))?,
            input_duration_secs: env::var("INPUT_DURATION_SECS")
                .unwrap_or_else(|_| INPUT_DURATION_SECS.to_string())
                .parse()
                .unwrap_or(INPUT_DURATION_SECS),
            output_json: env::var("OUTPUT_JSON")
                .map_err(|_| anyhow::anyhow!("OUTPUT_JSON must be set"))?,
            output_ttml: env::var("OUTPUT_TTML")
                .map_err(|_| anyhow::anyhow!("OUTPUT_TTML must be set"))?,
            output_text: env::var("OUTPUT_TEXT")
                .map_err(|_| anyhow::anyhow!("OUTPUT_TEXT must be set"))?,
            read_grant_ttl_secs: env::var("READ_GRANT_TTL_SECS")
                .unwrap_or_else(|_| READ_GRANT_TTL_SECS.to_string())
                .parse()
                .unwrap_or(READ_GRANT_TTL_SECS),
            write_grant_ttl_secs: env::var("WRITE_GRANT_TTL_SECS")
                .unwrap_or_else(|_| WRITE_GRANT_TTL_SECS.to_string())
                .parse()
                .unwrap_or(WRITE_GRANT_TTL_SECS),
            poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| POLL_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(POLL_INTERVAL_SECS),
            poll_deadline_secs: env::var("POLL_DEADLINE_SECS")
                .unwrap_or_else(|_| POLL_DEADLINE_SECS.to_string())
                .parse()
                .unwrap_or(POLL_DEADLINE_SECS),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| HTTP_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(HTTP_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.orchestrator_url.starts_with("http://")
            && !self.orchestrator_url.starts_with("https://")
        {
            return Err(anyhow::anyhow!(
                "ORCHESTRATOR_URL must be an http:// or https:// URL"
            ));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        let mut keys = [
            self.input_file.as_str(),
            self.output_json.as_str(),
            self.output_ttml.as_str(),
            self.output_text.as_str(),
        ];
        if keys.iter().any(|k| k.trim().is_empty()) {
            return Err(anyhow::anyhow!(
                "INPUT_FILE and output file names must not be empty"
            ));
        }
        keys.sort_unstable();
        if keys.windows(2).any(|w| w[0] == w[1]) {
            return Err(anyhow::anyhow!(
                "INPUT_FILE, OUTPUT_JSON, OUTPUT_TTML and OUTPUT_TEXT must all be distinct"
            ));
        }

        if self.input_duration_secs == 0 {
            return Err(anyhow::anyhow!("INPUT_DURATION_SECS must be at least 1"));
        }
        if self.poll_interval_secs == 0 {
            return Err(anyhow::anyhow!("POLL_INTERVAL_SECS must be at least 1"));
        }

        Ok(())
    }

    /// The input asset described by this configuration.
    pub fn asset(&self) -> MediaAsset {
        MediaAsset::new(
            self.media_folder.clone(),
            self.input_file.clone(),
            self.input_duration_secs,
        )
    }

    /// Output file names keyed by format.
    pub fn output_targets(&self) -> OutputTargets {
        OutputTargets {
            json: self.output_json.clone(),
            ttml: self.output_ttml.clone(),
            text: self.output_text.clone(),
        }
    }

    /// Bucket name recorded in job locators. Local runs have no real bucket
    /// and are labelled "local".
    pub fn bucket_label(&self) -> &str {
        self.s3_bucket.as_deref().unwrap_or("local")
    }

    pub fn read_grant_ttl(&self) -> Duration {
        Duration::from_secs(self.read_grant_ttl_secs)
    }

    pub fn write_grant_ttl(&self) -> Duration {
        Duration::from_secs(self.write_grant_ttl_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_deadline(&self) -> Option<Duration> {
        match self.poll_deadline_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
