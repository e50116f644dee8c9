//! Error types for Kiln

use thiserror::Error;

/// The main error type for Kiln operations
#[derive(Debug, Error)]
pub enum KilnError {
    #[error("Stage not configured: {stage} needs app id #{index}, but only {configured} configured")]
    StageNotConfigured {
        stage: &'static str,
        index: usize,
        configured: usize,
    },

    #[error("Stage call to '{stage_id}' failed: {message}")]
    StageCall { stage_id: String, message: String },

    #[error("Stage '{0}' returned no `result` payload")]
    MissingResult(String),

    #[error("Stage '{stage_id}' returned a malformed `result` payload: {detail}")]
    MalformedResult { stage_id: String, detail: String },

    #[error("Expansion error: {0}")]
    ExpansionError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

/// Result type alias for Kiln operations
pub type Result<T> = std::result::Result<T, KilnError>;

impl From<toml::de::Error> for KilnError {
    fn from(err: toml::de::Error) -> Self {
        KilnError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for KilnError {
    fn from(err: toml::ser::Error) -> Self {
        KilnError::TomlSerError(err.to_string())
    }
}
