//! Verbatim Core Library
//!
//! This crate provides the domain models, configuration, and the pure
//! job-envelope builder shared by all Verbatim components.

pub mod config;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use models::*;
pub use storage_types::StorageBackend;
