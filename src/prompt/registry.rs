//! Prompt registry and intent router.

use crate::error::ApiError;
use crate::prompt::chain::PromptChain;
use crate::prompt::config::PromptConfig;
use crate::prompt::selector::pick_weighted;
use crate::prompt::storage::{read_snapshot, write_snapshot, RegistrySnapshot};
use crate::prompt::template::{ChatTemplate, TemplateEntry, HISTORY_VARIABLE, QUESTION_VARIABLE};
use crate::provider::{ChatModel, MessageRole};
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How an explicit version request treats a disabled config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisabledPolicy {
    /// Disabled configs are never returned, even when asked for by version.
    #[default]
    Exclude,
    /// An exact version request returns the config even if it is disabled.
    AllowExplicitVersion,
}

/// Registry shared across threads.
pub type SharedPromptRegistry = Arc<RwLock<PromptRegistry>>;

type BoxedRng = Box<dyn RngCore + Send + Sync>;

/// Intent -> versioned prompt configs, with weighted selection and routing.
///
/// Owns its state; several independent registries can coexist. Persistence is
/// an explicit snapshot via [`PromptRegistry::save`].
pub struct PromptRegistry {
    order: Vec<String>,
    prompts: HashMap<String, Vec<PromptConfig>>,
    storage_path: Option<PathBuf>,
    disabled_policy: DisabledPolicy,
    rng: BoxedRng,
}

impl PromptRegistry {
    /// Create an empty registry with no storage path and an entropy-seeded RNG.
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            prompts: HashMap::new(),
            storage_path: None,
            disabled_policy: DisabledPolicy::default(),
            rng: Box::new(StdRng::from_entropy()),
        }
    }

    /// Create a registry bound to `path`, loading it if the file exists.
    ///
    /// Malformed JSON aborts construction.
    pub fn with_storage_path(path: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let path = path.into();
        let mut registry = Self::new();
        if path.exists() {
            registry.load_from(&path)?;
        }
        registry.storage_path = Some(path);
        Ok(registry)
    }

    /// Replace the random source used for A/B selection.
    pub fn with_rng(mut self, rng: impl RngCore + Send + Sync + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Use a deterministic seeded random source.
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_disabled_policy(mut self, policy: DisabledPolicy) -> Self {
        self.disabled_policy = policy;
        self
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = Box::new(StdRng::seed_from_u64(seed));
    }

    pub fn disabled_policy(&self) -> DisabledPolicy {
        self.disabled_policy
    }

    pub fn storage_path(&self) -> Option<&Path> {
        self.storage_path.as_deref()
    }

    pub fn into_shared(self) -> SharedPromptRegistry {
        Arc::new(RwLock::new(self))
    }

    /// Register a config, replacing any existing entry with the same
    /// `(intent, version)` in place. Never fails.
    pub fn register(&mut self, config: PromptConfig) -> &mut Self {
        let intent = config.intent.clone();
        let configs = match self.prompts.get_mut(&intent) {
            Some(configs) => configs,
            None => {
                self.order.push(intent.clone());
                self.prompts.entry(intent).or_default()
            }
        };

        if let Some(existing) = configs.iter_mut().find(|c| c.version == config.version) {
            tracing::debug!(prompt = %config.label(), "Replacing prompt config");
            *existing = config;
        } else {
            tracing::debug!(
                prompt = %config.label(),
                weight = config.weight,
                "Registering prompt config"
            );
            configs.push(config);
        }
        self
    }

    /// Remove one version, or the whole intent when `version` is `None`.
    ///
    /// Returns `false` only when the intent was never registered. Removing the
    /// last version leaves the intent key with an empty list.
    pub fn unregister(&mut self, intent: &str, version: Option<&str>) -> bool {
        if !self.prompts.contains_key(intent) {
            return false;
        }
        match version {
            Some(version) => {
                if let Some(configs) = self.prompts.get_mut(intent) {
                    configs.retain(|c| c.version != version);
                }
                tracing::debug!(intent, version, "Unregistered prompt version");
            }
            None => {
                self.prompts.remove(intent);
                self.order.retain(|name| name != intent);
                tracing::debug!(intent, "Unregistered intent");
            }
        }
        true
    }

    /// Intent names in first-registration order.
    pub fn list_intents(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// All stored configs for `intent`, disabled ones included.
    pub fn configs(&self, intent: &str) -> Option<&[PromptConfig]> {
        self.prompts.get(intent).map(Vec::as_slice)
    }

    /// Iterate intents and their configs in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PromptConfig])> + '_ {
        self.order.iter().filter_map(move |intent| {
            self.prompts
                .get(intent)
                .map(|configs| (intent.as_str(), configs.as_slice()))
        })
    }

    pub fn contains(&self, intent: &str) -> bool {
        self.prompts.contains_key(intent)
    }

    /// Number of intent keys.
    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Resolve a config for `intent`.
    ///
    /// With `version`, returns the exact match among enabled configs (or any
    /// config under [`DisabledPolicy::AllowExplicitVersion`]). Without it,
    /// picks among enabled configs by weight.
    pub fn get_config(&mut self, intent: &str, version: Option<&str>) -> Option<&PromptConfig> {
        let configs = self.prompts.get(intent)?;

        if let Some(version) = version {
            return configs.iter().find(|c| {
                c.version == version
                    && (c.enabled || self.disabled_policy == DisabledPolicy::AllowExplicitVersion)
            });
        }

        let enabled: Vec<&PromptConfig> = configs.iter().filter(|c| c.enabled).collect();
        let picked = pick_weighted(&enabled, |c| c.weight, &mut *self.rng)?;
        tracing::trace!(
            prompt = %picked.label(),
            candidates = enabled.len(),
            "Selected prompt config"
        );
        Some(picked)
    }

    /// Build the chat template for a resolved config.
    pub fn get_prompt(&mut self, intent: &str, version: Option<&str>) -> Option<ChatTemplate> {
        self.get_config(intent, version).map(build_template)
    }

    /// Resolve `intent` into a template bound to `llm`. Performs no LLM call.
    pub fn get_chain(
        &mut self,
        intent: &str,
        llm: Arc<dyn ChatModel>,
        version: Option<&str>,
    ) -> Result<PromptChain, ApiError> {
        let config = self
            .get_config(intent, version)
            .ok_or_else(|| match version {
                Some(v) => {
                    ApiError::NotFound(format!("Intent not found: {} (version {})", intent, v))
                }
                None => ApiError::NotFound(format!("Intent not found: {}", intent)),
            })?;
        Ok(PromptChain::from_config(config, llm))
    }

    /// Resolve `intent`, falling back to `default_intent`, into a chain.
    pub fn route(
        &mut self,
        intent: &str,
        llm: Arc<dyn ChatModel>,
        default_intent: Option<&str>,
    ) -> Result<PromptChain, ApiError> {
        if let Some(config) = self.get_config(intent, None) {
            return Ok(PromptChain::from_config(config, llm));
        }
        if let Some(default_intent) = default_intent {
            if let Some(config) = self.get_config(default_intent, None) {
                tracing::info!(intent, fallback = default_intent, "Routing to default intent");
                return Ok(PromptChain::from_config(config, llm));
            }
        }
        let fallback = match default_intent {
            Some(d) => format!("default intent '{}' is not usable either", d),
            None => "no default intent given".to_string(),
        };
        Err(ApiError::NotFound(format!(
            "Intent not found: {}, and {}",
            intent, fallback
        )))
    }

    /// Ordered copy of every stored config, disabled ones included.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            intents: self
                .iter()
                .map(|(intent, configs)| (intent.to_string(), configs.to_vec()))
                .collect(),
        }
    }

    /// Write every config to `path`, or to the configured storage path.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf, ApiError> {
        let target = path
            .map(Path::to_path_buf)
            .or_else(|| self.storage_path.clone())
            .ok_or_else(|| ApiError::ConfigError("No storage path specified".to_string()))?;
        write_snapshot(&target, &self.snapshot())?;
        tracing::info!(path = %target.display(), intents = self.len(), "Saved prompt registry");
        Ok(target)
    }

    /// Re-register every record found in `path`.
    pub fn load_from(&mut self, path: &Path) -> Result<(), ApiError> {
        let snapshot = read_snapshot(path)?;
        let mut count = 0usize;
        for (intent, configs) in snapshot.intents {
            for config in configs {
                if config.intent != intent {
                    tracing::warn!(
                        key = %intent,
                        record = %config.intent,
                        "Record intent differs from its key; using the record's intent"
                    );
                }
                self.register(config);
                count += 1;
            }
        }
        tracing::info!(path = %path.display(), configs = count, "Loaded prompt registry");
        Ok(())
    }
}

impl Default for PromptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PromptRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptRegistry")
            .field("intents", &self.order)
            .field("storage_path", &self.storage_path)
            .field("disabled_policy", &self.disabled_policy)
            .finish_non_exhaustive()
    }
}

/// system -> [history] -> human("{question}")
pub fn build_template(config: &PromptConfig) -> ChatTemplate {
    let mut entries = vec![TemplateEntry::Message {
        role: MessageRole::System,
        template: config.system_prompt.clone(),
    }];
    if config.include_history {
        entries.push(TemplateEntry::Placeholder {
            variable: HISTORY_VARIABLE.to_string(),
            optional: true,
        });
    }
    entries.push(TemplateEntry::Message {
        role: MessageRole::Human,
        template: format!("{{{}}}", QUESTION_VARIABLE),
    });
    ChatTemplate::from_entries(entries)
}
