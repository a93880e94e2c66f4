//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must
//! implement, together with the storage error taxonomy.

use crate::StorageBackend;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("URL signing failed: {0}")]
    SignFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait.
/// The workflow stages the input, hands out access grants, fetches results
/// and reaps artifacts exclusively through it.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store data under the given key, overwriting any existing object.
    async fn put(&self, storage_key: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Fetch the object stored under the given key.
    async fn get(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete the object stored under the given key.
    ///
    /// Deleting an absent object succeeds; the reaper relies on this when a
    /// run is torn down before every artifact was produced.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Generate a time-scoped signed URL for reading an object (GET).
    ///
    /// A pure local computation against the signing credentials; no call is
    /// made to the storage service and no object state changes.
    async fn signed_get_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Generate a time-scoped signed URL for writing an object (PUT).
    ///
    /// The content type, where given, documents what the holder is expected
    /// to upload; it is not bound into the signature.
    async fn signed_put_url(
        &self,
        storage_key: &str,
        _content_type: Option<&str>,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Check if an object exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
