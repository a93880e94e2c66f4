use serde::{Deserialize, Serialize};

use super::job::OutputFormat;

/// Reference to one object in the staging bucket.
///
/// The access URL is a time-scoped signed URL injected before the locator
/// is embedded in a job description; the remote worker only ever touches
/// storage through these URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLocator {
    pub bucket: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_url: Option<String>,
}

impl StorageLocator {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            access_url: None,
        }
    }

    pub fn with_access_url(mut self, url: impl Into<String>) -> Self {
        self.access_url = Some(url.into());
        self
    }

    pub fn has_access_url(&self) -> bool {
        self.access_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Signed URLs issued for one run: a read grant for the staged input and a
/// write grant per output format.
#[derive(Debug, Clone)]
pub struct GrantSet {
    pub input_url: String,
    pub json_url: String,
    pub ttml_url: String,
    pub text_url: String,
}

impl GrantSet {
    pub fn output_url(&self, format: OutputFormat) -> &str {
        match format {
            OutputFormat::Json => &self.json_url,
            OutputFormat::Ttml => &self.ttml_url,
            OutputFormat::Text => &self.text_url,
        }
    }
}

/// Output file names keyed by format. The names double as storage keys and
/// as local file names when results are fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTargets {
    pub json: String,
    pub ttml: String,
    pub text: String,
}

impl OutputTargets {
    pub fn key(&self, format: OutputFormat) -> &str {
        match format {
            OutputFormat::Json => &self.json,
            OutputFormat::Ttml => &self.ttml,
            OutputFormat::Text => &self.text,
        }
    }

    /// Formats with their file names, in submission order.
    pub fn iter(&self) -> impl Iterator<Item = (OutputFormat, &str)> {
        OutputFormat::ALL
            .into_iter()
            .map(move |format| (format, self.key(format)))
    }
}
