//! Layered configuration and the per-user stage configuration store
//!
//! Application config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `KILN_OUTPUT_DIR`, `KILN_MEMORY_FILE`,
//!    `KILN_OLLAMA_URL`, `KILN_EXPANDER_MODEL`, `KILN_APP_IDS`
//! 2. Project-local: `.kiln/config.toml`
//! 3. Global: `~/.kiln/config.toml`

use kiln_core::{KilnError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::info;

/// Ordered stage app ids for one user: text-to-image first, image-to-model second
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default)]
    pub app_ids: Vec<String>,
}

impl StageConfig {
    pub fn new<I, S>(app_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            app_ids: app_ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// Shared `user_id -> StageConfig` store.
///
/// Clones share the same map. There is no coordination beyond the lock
/// around each individual read or write.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    inner: Arc<RwLock<HashMap<String, StageConfig>>>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from the `[users]` table of an application config
    pub fn from_config(config: &KilnConfig) -> Self {
        let store = Self::new();
        store.apply(config.users.clone());
        store
    }

    /// Store each user's configuration, replacing any earlier entry
    pub fn apply(&self, configuration: HashMap<String, StageConfig>) {
        let mut map = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for (user_id, conf) in configuration {
            info!(user_id = %user_id, app_ids = ?conf.app_ids, "Saving new config for user");
            map.insert(user_id, conf);
        }
    }

    /// Configuration for `user_id`, if any has been applied
    pub fn get(&self, user_id: &str) -> Option<StageConfig> {
        let map = match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.get(user_id).cloned()
    }

    /// The user's stage app ids; empty when the user has no configuration
    pub fn stage_ids(&self, user_id: &str) -> Vec<String> {
        self.get(user_id).map(|c| c.app_ids).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        match self.inner.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Where artifacts and the long-term memory file are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_memory_file")]
    pub memory_file: String,
    /// Append a random suffix to the run timestamp in artifact filenames
    #[serde(default)]
    pub unique_suffix: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            memory_file: default_memory_file(),
            unique_suffix: false,
        }
    }
}

impl OutputConfig {
    pub fn memory_path(&self) -> PathBuf {
        self.dir.join(&self.memory_file)
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_memory_file() -> String {
    "memory.json".to_string()
}

/// Local text-generation model used for prompt expansion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpanderConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    #[serde(default = "default_expander_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_ollama_url(),
            model: default_expander_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_expander_model() -> String {
    "gpt2".to_string()
}
fn default_max_tokens() -> u32 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_user")]
    pub default_user: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_user: default_user(),
        }
    }
}

fn default_user() -> String {
    "super-user".to_string()
}

/// Top-level config file structure; every section is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct KilnConfigFile {
    #[serde(default)]
    output: Option<OutputSection>,
    #[serde(default)]
    expander: Option<ExpanderSection>,
    #[serde(default)]
    pipeline: Option<PipelineSection>,
    #[serde(default)]
    users: HashMap<String, StageConfig>,
}

// Sections with every field optional, so a higher layer only overrides
// what it actually sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct OutputSection {
    dir: Option<PathBuf>,
    memory_file: Option<String>,
    unique_suffix: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ExpanderSection {
    enabled: Option<bool>,
    base_url: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PipelineSection {
    default_user: Option<String>,
}

/// Resolved configuration with environment variable overrides applied
#[derive(Debug, Clone, Default)]
pub struct KilnConfig {
    pub output: OutputConfig,
    pub expander: ExpanderConfig,
    pub pipeline: PipelineConfig,
    pub users: HashMap<String, StageConfig>,
}

impl KilnConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = KilnConfig::default();

        // Layer 1: Global config (~/.kiln/config.toml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 2: Project-local config (.kiln/config.toml)
        let local_path = PathBuf::from(".kiln/config.toml");
        if local_path.exists() {
            let local = Self::load_file(&local_path)?;
            config.merge(local);
        }

        // Layer 3: Environment variable overrides
        config.apply_env_overrides();

        Ok(config)
    }

    /// Load config from a specific file path only (for testing)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = KilnConfig::default();
        config.merge(Self::load_file(path)?);
        config.apply_env_overrides();
        Ok(config)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".kiln").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<KilnConfigFile> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            KilnError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    fn merge(&mut self, overlay: KilnConfigFile) {
        if let Some(output) = overlay.output {
            if let Some(dir) = output.dir {
                self.output.dir = dir;
            }
            if let Some(memory_file) = output.memory_file {
                self.output.memory_file = memory_file;
            }
            if let Some(unique) = output.unique_suffix {
                self.output.unique_suffix = unique;
            }
        }

        if let Some(expander) = overlay.expander {
            if let Some(enabled) = expander.enabled {
                self.expander.enabled = enabled;
            }
            if let Some(base_url) = expander.base_url {
                self.expander.base_url = base_url;
            }
            if let Some(model) = expander.model {
                self.expander.model = model;
            }
            if let Some(max_tokens) = expander.max_tokens {
                self.expander.max_tokens = max_tokens;
            }
        }

        if let Some(default_user) = overlay.pipeline.and_then(|p| p.default_user) {
            self.pipeline.default_user = default_user;
        }

        // Users replace wholesale per id, matching `ConfigStore::apply`
        self.users.extend(overlay.users);
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("KILN_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(dir);
        }
        if let Ok(file) = std::env::var("KILN_MEMORY_FILE") {
            self.output.memory_file = file;
        }
        if let Ok(url) = std::env::var("KILN_OLLAMA_URL") {
            self.expander.base_url = url;
        }
        if let Ok(model) = std::env::var("KILN_EXPANDER_MODEL") {
            self.expander.model = model;
        }
        if let Ok(ids) = std::env::var("KILN_APP_IDS") {
            self.users.insert(
                self.pipeline.default_user.clone(),
                StageConfig::new(parse_app_ids(&ids)),
            );
        }
    }
}

fn parse_app_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
