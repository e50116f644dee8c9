//! Kiln Core - Foundational types for the Kiln generation pipeline
//!
//! This crate provides the types that the pipeline crate depends on:
//! - `InteractionRecord` - One remembered pipeline run
//! - `RunToken` - Shared timestamp token for a run's artifact filenames
//! - `ContentHash` - SHA-256 based content hashing
//! - Error types and Result alias

mod error;
mod hash;
mod record;
mod token;

pub use error::{KilnError, Result};
pub use hash::ContentHash;
pub use record::InteractionRecord;
pub use token::{RunToken, TIMESTAMP_FORMAT};
