//! Kiln Pipeline - prompt to image to 3D model
//!
//! Expands a free-text prompt with an optional local model, chains a
//! text-to-image stage into an image-to-3D stage through a pluggable
//! `StageCaller`, saves both artifacts under a shared timestamp token, and
//! remembers each run in session-scoped and long-term memory.

pub mod artifact;
pub mod config;
pub mod expander;
pub mod memory;
pub mod ollama;
pub mod orchestrator;
pub mod stage;
pub mod stages;
pub mod telemetry;

pub use artifact::{ArtifactKind, ArtifactStore, SavedArtifact};
pub use config::{ConfigStore, ExpanderConfig, KilnConfig, OutputConfig, StageConfig};
pub use expander::{ExpansionCapability, Generation, PromptExpander, TextGenerator};
pub use memory::{LongTermStore, MemoryLedger, Session};
pub use orchestrator::{Pipeline, RunSummary};
pub use stage::{Payload, PayloadValue, Stage, StageCaller};
