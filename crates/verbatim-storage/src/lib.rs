//! Verbatim Storage Library
//!
//! This crate provides the staging-bucket abstraction for the workflow.
//! It includes the Storage trait, implementations for S3 and local
//! filesystem, and a config-driven factory.
//!
//! # Storage key format
//!
//! Keys are flat file names: the staged input and its transcription
//! artifacts live at the bucket root, keyed by their file names. Keys must
//! not contain `..` or a leading `/`.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::{S3Credentials, S3Storage};
pub use traits::{Storage, StorageError, StorageResult};
pub use verbatim_core::StorageBackend;
