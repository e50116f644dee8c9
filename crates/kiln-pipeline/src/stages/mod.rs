//! Stage collaborator registry
//!
//! Maps collaborator names to concrete `StageCaller` implementations.

pub mod mock;

use crate::stage::StageCaller;
use kiln_core::{KilnError, Result};

/// Create a stage collaborator by name
pub fn create_caller(name: &str) -> Result<Box<dyn StageCaller>> {
    match name {
        "mock" => Ok(Box::new(mock::MockStageCaller::new())),
        _ => Err(KilnError::ConfigError(format!(
            "Unknown stage collaborator '{}'. Available: {}",
            name,
            available_callers().join(", ")
        ))),
    }
}

/// List all built-in collaborator names
pub fn available_callers() -> Vec<&'static str> {
    vec!["mock"]
}
