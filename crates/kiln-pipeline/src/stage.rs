//! Stage collaborator trait and payload types

use kiln_core::{KilnError, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Key under which a stage returns its binary output
pub const RESULT_KEY: &str = "result";

/// The two generation stages, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TextToImage,
    ImageToModel,
}

impl Stage {
    /// Position of this stage's app id in the configured list
    pub fn index(self) -> usize {
        match self {
            Stage::TextToImage => 0,
            Stage::ImageToModel => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::TextToImage => "text-to-image",
            Stage::ImageToModel => "image-to-model",
        }
    }

    /// Look up this stage's app id, failing when the list is too short
    pub fn resolve(self, app_ids: &[String]) -> Result<&str> {
        app_ids
            .get(self.index())
            .map(String::as_str)
            .ok_or(KilnError::StageNotConfigured {
                stage: self.label(),
                index: self.index(),
                configured: app_ids.len(),
            })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single value in a stage payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadValue {
    Text(String),
    Bytes(Vec<u8>),
}

/// An ordered key/value mapping sent to, and returned by, a stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    entries: BTreeMap<String, PayloadValue>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a text entry
    pub fn with_text(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entries
            .insert(key.to_string(), PayloadValue::Text(value.into()));
        self
    }

    /// Builder: add a binary entry
    pub fn with_bytes(mut self, key: &str, value: impl Into<Vec<u8>>) -> Self {
        self.entries
            .insert(key.to_string(), PayloadValue::Bytes(value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.entries.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(PayloadValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn bytes(&self, key: &str) -> Option<&[u8]> {
        match self.entries.get(key) {
            Some(PayloadValue::Bytes(b)) => Some(b),
            _ => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take the binary `result` entry out of a stage response
    pub fn into_result(mut self, stage_id: &str) -> Result<Vec<u8>> {
        match self.entries.remove(RESULT_KEY) {
            Some(PayloadValue::Bytes(bytes)) => Ok(bytes),
            Some(PayloadValue::Text(_)) => Err(KilnError::MalformedResult {
                stage_id: stage_id.to_string(),
                detail: "expected binary data, got text".to_string(),
            }),
            None => Err(KilnError::MissingResult(stage_id.to_string())),
        }
    }
}

/// Transport used to invoke a remote generation stage.
///
/// Calls are synchronous and single-shot: the pipeline blocks until the
/// collaborator returns and never retries. Transport, auth and retry
/// policy belong to the implementation.
pub trait StageCaller: Send + Sync {
    /// Collaborator name (e.g. "mock")
    fn name(&self) -> &str;

    /// Invoke the stage addressed by `stage_id` on behalf of `user_id`
    fn call(&self, stage_id: &str, payload: &Payload, user_id: &str) -> Result<Payload>;
}
