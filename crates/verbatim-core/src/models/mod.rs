//! Data models for the workflow
//!
//! This module contains the value types passed between workflow stages,
//! organized by domain: the input asset, storage locators and grants, the
//! job envelope with its lifecycle states, and the access token.

mod asset;
mod job;
mod locator;
mod token;

// Re-export all models for convenient imports
pub use asset::*;
pub use job::*;
pub use locator::*;
pub use token::*;
