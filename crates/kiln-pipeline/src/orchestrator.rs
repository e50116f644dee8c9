//! Prompt → image → 3D model pipeline
//!
//! A run executes strictly in sequence:
//! 1. resolve the user's stage app ids (empty if unconfigured)
//! 2. expand the prompt
//! 3. call the text-to-image stage with `{prompt}`
//! 4. save the image
//! 5. call the image-to-model stage with `{image}`
//! 6. save the model
//! 7. record the interaction in short- and long-term memory
//!
//! Any failure in steps 3-7 aborts the run. Nothing is rolled back: an
//! image saved in step 4 stays on disk if step 5 or 6 fails. App ids are
//! looked up when each stage needs them, so a config with a single id
//! fails at step 5, after the image is already written.

use crate::artifact::{ArtifactKind, ArtifactStore, SavedArtifact};
use crate::config::{ConfigStore, KilnConfig};
use crate::expander::PromptExpander;
use crate::memory::{MemoryLedger, Session};
use crate::stage::{Payload, Stage, StageCaller};
use kiln_core::{InteractionRecord, Result, RunToken};
use std::fmt;
use tracing::info;

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub record: InteractionRecord,
    pub token: RunToken,
    pub image: SavedArtifact,
    pub model: SavedArtifact,
}

impl RunSummary {
    /// Human-readable status message naming both artifacts
    pub fn message(&self) -> String {
        format!(
            "✅ 3D model generation complete!\n\
             - Image: `{}`\n\
             - 3D model: `{}`\n\
             (Memory stored for remixing later.)",
            self.image.filename, self.model.filename
        )
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

pub struct Pipeline {
    configs: ConfigStore,
    expander: PromptExpander,
    caller: Box<dyn StageCaller>,
    artifacts: ArtifactStore,
    ledger: MemoryLedger,
    unique_suffix: bool,
}

impl Pipeline {
    pub fn new(
        configs: ConfigStore,
        expander: PromptExpander,
        caller: Box<dyn StageCaller>,
        artifacts: ArtifactStore,
        ledger: MemoryLedger,
    ) -> Self {
        Self {
            configs,
            expander,
            caller,
            artifacts,
            ledger,
            unique_suffix: false,
        }
    }

    /// Build a pipeline from application config.
    ///
    /// This is where the local expansion model is probed, once.
    pub fn from_config(
        config: &KilnConfig,
        configs: ConfigStore,
        caller: Box<dyn StageCaller>,
    ) -> Self {
        Self::new(
            configs,
            PromptExpander::from_config(&config.expander),
            caller,
            ArtifactStore::new(&config.output.dir),
            MemoryLedger::at(config.output.memory_path()),
        )
        .with_unique_suffix(config.output.unique_suffix)
    }

    /// Append a random suffix to each run's timestamp token
    pub fn with_unique_suffix(mut self, enabled: bool) -> Self {
        self.unique_suffix = enabled;
        self
    }

    pub fn configs(&self) -> &ConfigStore {
        &self.configs
    }

    pub fn ledger(&self) -> &MemoryLedger {
        &self.ledger
    }

    /// Run the full pipeline for `prompt` on behalf of `user_id`
    pub fn run(&self, prompt: &str, user_id: &str, session: &mut Session) -> Result<RunSummary> {
        let app_ids = self.configs.stage_ids(user_id);
        info!(user_id, prompt, stages = app_ids.len(), "Received prompt");

        let expanded = self.expander.expand(prompt);

        // Text -> image
        let text_to_image = Stage::TextToImage.resolve(&app_ids)?;
        info!(stage = %Stage::TextToImage, app_id = text_to_image, caller = self.caller.name(), "Calling stage");
        let image_bytes = self
            .caller
            .call(
                text_to_image,
                &Payload::new().with_text("prompt", expanded.as_str()),
                user_id,
            )?
            .into_result(text_to_image)?;

        let token = RunToken::now(self.unique_suffix);
        let image = self.artifacts.save(ArtifactKind::Image, &image_bytes, &token)?;

        // Image -> 3D model
        let image_to_model = Stage::ImageToModel.resolve(&app_ids)?;
        info!(stage = %Stage::ImageToModel, app_id = image_to_model, caller = self.caller.name(), "Calling stage");
        let model_bytes = self
            .caller
            .call(
                image_to_model,
                &Payload::new().with_bytes("image", image_bytes),
                user_id,
            )?
            .into_result(image_to_model)?;

        let model = self.artifacts.save(ArtifactKind::Model, &model_bytes, &token)?;

        let record = InteractionRecord {
            prompt: prompt.to_string(),
            expanded,
            image_file: image.filename.clone(),
            model_file: model.filename.clone(),
        };
        self.ledger.record(session, record.clone())?;

        Ok(RunSummary {
            record,
            token,
            image,
            model,
        })
    }
}
