//! Environment variable source: PROMPTMUX__ prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

pub const ENV_PREFIX: &str = "PROMPTMUX";

/// Add environment variable overlay to builder.
///
/// `PROMPTMUX__LLM__PROVIDER=deepseek` sets `llm.provider`. The single
/// underscore `PROMPTMUX_LOG*` variables belong to logging and do not match.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    ))
}
