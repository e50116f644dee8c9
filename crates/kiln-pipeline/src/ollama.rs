//! Ollama-backed local text generator
//!
//! Talks to a locally running Ollama server. `connect` checks once that the
//! server answers and has the configured model pulled; `generate` sends a
//! single non-streaming request. Nothing here retries.

use crate::expander::{Generation, TextGenerator};
use kiln_core::{KilnError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 3;

const EXPANSION_SYSTEM_PROMPT: &str = "Expand the user's idea into a vivid, concrete \
description of a single object or scene for an image generator. Reply with the \
description only.";

#[derive(Debug, Clone, Deserialize)]
struct OllamaModel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Text generator backed by Ollama's `/api/generate` endpoint
pub struct OllamaGenerator {
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OllamaGenerator {
    /// Ping the server and confirm `model` is available locally
    pub fn connect(base_url: &str, model: &str, max_tokens: u32) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let url = format!("{}/api/tags", base_url);

        let mut response = build_agent(CONNECT_TIMEOUT_SECS)
            .get(&url)
            .call()
            .map_err(|e| {
                KilnError::ExpansionError(format!("Ollama unreachable at {}: {}", url, e))
            })?;

        let tags: TagsResponse = response.body_mut().read_json().map_err(|e| {
            KilnError::ExpansionError(format!("Failed to parse Ollama response: {}", e))
        })?;

        let names: Vec<&str> = tags.models.iter().map(|m| m.name.as_str()).collect();
        if !model_available(&names, model) {
            return Err(KilnError::ExpansionError(format!(
                "Model '{}' not found in Ollama (have: {})",
                model,
                names.join(", ")
            )));
        }

        Ok(Self {
            base_url,
            model: model.to_string(),
            max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextGenerator for OllamaGenerator {
    fn name(&self) -> &str {
        "ollama"
    }

    fn generate(&self, prompt: &str) -> Result<Vec<Generation>> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateBody {
            model: &self.model,
            prompt,
            system: EXPANSION_SYSTEM_PROMPT,
            stream: false,
            options: GenerateOptions {
                num_predict: self.max_tokens,
            },
        };

        let mut response = build_agent(REQUEST_TIMEOUT_SECS)
            .post(&url)
            .header("Content-Type", "application/json")
            .send_json(&body)
            .map_err(|e| KilnError::ExpansionError(format!("Ollama request failed: {}", e)))?;

        let parsed: GenerateResponse = response.body_mut().read_json().map_err(|e| {
            KilnError::ExpansionError(format!("Failed to parse Ollama response: {}", e))
        })?;

        Ok(vec![Generation {
            generated_text: parsed.response,
        }])
    }
}

fn build_agent(timeout_secs: u64) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(timeout_secs)))
        .build();
    config.into()
}

/// Ollama lists models as `name:tag`; a bare name matches any tag
fn model_available(names: &[&str], model: &str) -> bool {
    names.iter().any(|name| {
        *name == model
            || name
                .split_once(':')
                .map(|(base, _)| base == model)
                .unwrap_or(false)
    })
}
