//! Prompt expansion with graceful degradation
//!
//! Expansion is optional. The local text-generation capability is resolved
//! once when the expander is built; if that fails the expander stays in the
//! `Unavailable` state for its whole lifetime and passes prompts through
//! untouched. A failed generation at run time also passes the prompt
//! through. `expand` never returns an error.

use crate::config::ExpanderConfig;
use crate::ollama::OllamaGenerator;
use kiln_core::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One candidate returned by a text generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    pub generated_text: String,
}

/// A local text-in/text-out model
pub trait TextGenerator: Send + Sync {
    /// Generator name (e.g. "ollama")
    fn name(&self) -> &str;

    /// Generate candidates for `prompt`; the first one is used
    fn generate(&self, prompt: &str) -> Result<Vec<Generation>>;
}

/// Whether a text generator could be set up for this process
pub enum ExpansionCapability {
    Available(Box<dyn TextGenerator>),
    Unavailable,
}

pub struct PromptExpander {
    capability: ExpansionCapability,
}

impl PromptExpander {
    pub fn new(capability: ExpansionCapability) -> Self {
        Self { capability }
    }

    /// An expander that always returns its input
    pub fn unavailable() -> Self {
        Self::new(ExpansionCapability::Unavailable)
    }

    pub fn with_generator(generator: Box<dyn TextGenerator>) -> Self {
        Self::new(ExpansionCapability::Available(generator))
    }

    /// Try once to reach the configured local model.
    ///
    /// Any failure here disables expansion for the lifetime of the
    /// returned expander; there is no retry.
    pub fn from_config(config: &ExpanderConfig) -> Self {
        if !config.enabled {
            info!("Prompt expansion disabled by configuration");
            return Self::unavailable();
        }

        match OllamaGenerator::connect(&config.base_url, &config.model, config.max_tokens) {
            Ok(generator) => {
                info!(model = %config.model, url = %config.base_url, "Local LLM loaded");
                Self::with_generator(Box::new(generator))
            }
            Err(e) => {
                warn!(error = %e, "Couldn't load local LLM; proceeding without expansion");
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.capability, ExpansionCapability::Available(_))
    }

    /// Expand `prompt`, or return it unchanged if expansion is unavailable
    /// or fails for any reason
    pub fn expand(&self, prompt: &str) -> String {
        let generator = match &self.capability {
            ExpansionCapability::Available(g) => g,
            ExpansionCapability::Unavailable => {
                info!("No local LLM; using original prompt");
                return prompt.to_string();
            }
        };

        match generator.generate(prompt) {
            Ok(generations) => match generations.into_iter().next() {
                Some(first) if !first.generated_text.trim().is_empty() => {
                    let expanded = first.generated_text.trim().to_string();
                    info!(generator = generator.name(), expanded = %expanded, "Expanded prompt");
                    expanded
                }
                _ => {
                    warn!(
                        generator = generator.name(),
                        "LLM returned no text, using original prompt"
                    );
                    prompt.to_string()
                }
            },
            Err(e) => {
                warn!(
                    generator = generator.name(),
                    error = %e,
                    "LLM expansion failed, using original prompt"
                );
                prompt.to_string()
            }
        }
    }
}
