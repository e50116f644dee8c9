//! The durable unit of memory

use serde::{Deserialize, Serialize};

/// One complete pipeline run: what was asked, what was sent, what was made.
///
/// Field names are the on-disk JSON keys of the long-term store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// The prompt exactly as the user wrote it
    pub prompt: String,
    /// The prompt after the expansion step (equal to `prompt` when skipped)
    pub expanded: String,
    /// Filename of the text-to-image artifact
    pub image_file: String,
    /// Filename of the image-to-model artifact
    pub model_file: String,
}

impl InteractionRecord {
    /// Whether the expander changed the prompt for this run
    pub fn was_expanded(&self) -> bool {
        self.prompt != self.expanded
    }
}
