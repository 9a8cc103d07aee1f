//! Configuration Management
//!
//! Layered application configuration: built-in defaults, the per-user
//! `config.toml`, an optional explicit file, then `PROMPTMUX__*` environment
//! variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use crate::logging::LoggingConfig;
pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::error::ApiError;
use crate::prompt::{DisabledPolicy, PromptRegistry};
use crate::provider::factory::DEFAULT_TEMPERATURE;
use crate::provider::{EmbeddingRequest, LlmRequest};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub embedding: EmbeddingSettings,
}

/// Where the registry lives and how it selects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// JSON snapshot path; `None` means `$XDG_CONFIG_HOME/promptmux/prompts.json`.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,

    #[serde(default)]
    pub disabled_policy: DisabledPolicy,

    /// Fixed RNG seed for reproducible A/B selection.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl RegistryConfig {
    pub fn resolve_storage_path(&self) -> Result<PathBuf, ApiError> {
        match &self.storage_path {
            Some(path) if !path.as_os_str().is_empty() => Ok(path.clone()),
            _ => xdg::default_registry_path(),
        }
    }

    /// Open the registry at `storage_override` or the configured path.
    pub fn open_registry(
        &self,
        storage_override: Option<PathBuf>,
    ) -> Result<PromptRegistry, ApiError> {
        let path = match storage_override {
            Some(path) => path,
            None => self.resolve_storage_path()?,
        };
        let registry =
            PromptRegistry::with_storage_path(path)?.with_disabled_policy(self.disabled_policy);
        Ok(match self.seed {
            Some(seed) => registry.with_seed(seed),
            None => registry,
        })
    }
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_intent() -> Option<String> {
    Some(crate::prompt::GENERAL_INTENT.to_string())
}

/// Chat model defaults for `ask` and `chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Falls back to `LLM_PROVIDER`, then `qwen`.
    #[serde(default)]
    pub provider: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// HTTP timeout in seconds; the client default is 60.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Messages kept per `chat` session; unbounded when unset.
    #[serde(default)]
    pub history_window: Option<usize>,

    /// Fallback intent for routing.
    #[serde(default = "default_intent")]
    pub default_intent: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            timeout_secs: None,
            history_window: None,
            default_intent: default_intent(),
        }
    }
}

impl LlmSettings {
    /// Request with CLI overrides applied over these settings.
    pub fn to_request(&self, provider: Option<&str>, model: Option<&str>) -> LlmRequest {
        LlmRequest {
            provider: provider.map(str::to_string).or_else(|| self.provider.clone()),
            model: model.map(str::to_string).or_else(|| self.model.clone()),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            api_key: None,
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Embedding model defaults for `embed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default)]
    pub provider: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub dimensions: Option<usize>,
}

impl EmbeddingSettings {
    /// Request with CLI overrides applied over these settings.
    pub fn to_request(&self, provider: Option<&str>, model: Option<&str>) -> EmbeddingRequest {
        EmbeddingRequest {
            provider: provider.map(str::to_string).or_else(|| self.provider.clone()),
            model: model.map(str::to_string).or_else(|| self.model.clone()),
            dimensions: self.dimensions,
            api_key: None,
        }
    }
}
