//! Built-in defaults seeded into every builder.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder with defaults for keys that later sources commonly override.
///
/// Fields missing here fall back to their serde defaults.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("registry.disabled_policy", "exclude")?
        .set_default("llm.temperature", 0.7)?
        .set_default("llm.default_intent", "general")
}
