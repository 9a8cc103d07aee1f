use crate::validation::ValidationResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_VERSION: &str = "1.0";
pub const DEFAULT_WEIGHT: u32 = 100;
pub const MAX_WEIGHT: u32 = 100;

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_weight() -> u32 {
    DEFAULT_WEIGHT
}

fn default_true() -> bool {
    true
}

/// One versioned, weighted prompt definition belonging to an intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Intent this config is grouped under.
    pub intent: String,

    /// Display name; not unique.
    pub name: String,

    /// System prompt template body.
    pub system_prompt: String,

    /// Unique within the intent; re-registering the same version replaces it.
    #[serde(default = "default_version")]
    pub version: String,

    /// Relative A/B weight, nominally 0-100.
    #[serde(default = "default_weight")]
    pub weight: u32,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Reserve a `history` slot between the system and human entries.
    #[serde(default)]
    pub include_history: bool,

    /// Free-form extension data, passed through untouched.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl PromptConfig {
    pub fn new(
        intent: impl Into<String>,
        name: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            intent: intent.into(),
            name: name.into(),
            system_prompt: system_prompt.into(),
            version: default_version(),
            weight: DEFAULT_WEIGHT,
            enabled: true,
            include_history: false,
            metadata: Map::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_history(mut self, include_history: bool) -> Self {
        self.include_history = include_history;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// `intent@version`, used in logs and diagnostics.
    pub fn label(&self) -> String {
        format!("{}@{}", self.intent, self.version)
    }

    /// Report inputs that `register` accepts but that will degrade routing.
    ///
    /// Registration never rejects a config; this is the diagnostic view of the
    /// same rules.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new(self.label());

        result.add_check("Intent is not empty", !self.intent.trim().is_empty());
        result.add_check("Name is not empty", !self.name.trim().is_empty());
        result.add_check(
            "System prompt is not empty",
            !self.system_prompt.trim().is_empty(),
        );
        result.add_check("Version is not empty", !self.version.trim().is_empty());

        if self.weight > MAX_WEIGHT {
            result.add_warning(format!(
                "Weight {} exceeds {} and will skew selection",
                self.weight, MAX_WEIGHT
            ));
        } else if self.weight == 0 {
            result.add_warning("Weight is 0; this version is never picked at random".to_string());
        }

        if !self.enabled {
            result.add_warning("Config is disabled".to_string());
        }

        if let Err(e) = super::template::template_variables(&self.system_prompt) {
            result.add_error(format!("System prompt is not a valid template: {}", e));
        }

        result
    }
}
