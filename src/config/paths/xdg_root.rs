//! XDG Base Directory paths for promptmux files.

use crate::error::ApiError;
use std::path::PathBuf;

pub const APP_DIR: &str = "promptmux";
pub const CONFIG_FILE: &str = "config.toml";
pub const REGISTRY_FILE: &str = "prompts.json";

/// `$XDG_CONFIG_HOME` if set and non-empty, otherwise `$HOME/.config`.
pub fn config_home() -> Result<PathBuf, ApiError> {
    config_home_from(
        std::env::var("XDG_CONFIG_HOME").ok(),
        std::env::var("HOME").ok(),
    )
}

fn config_home_from(xdg: Option<String>, home: Option<String>) -> Result<PathBuf, ApiError> {
    if let Some(xdg) = xdg.filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg));
    }
    let home = home.filter(|v| !v.is_empty()).ok_or_else(|| {
        ApiError::ConfigError(
            "Could not determine XDG config home directory (HOME not set)".to_string(),
        )
    })?;
    Ok(PathBuf::from(home).join(".config"))
}

/// `$XDG_CONFIG_HOME/promptmux/`. Not created here.
pub fn app_config_dir() -> Result<PathBuf, ApiError> {
    Ok(config_home()?.join(APP_DIR))
}

/// `$XDG_CONFIG_HOME/promptmux/config.toml`
pub fn global_config_path() -> Result<PathBuf, ApiError> {
    Ok(app_config_dir()?.join(CONFIG_FILE))
}

/// `$XDG_CONFIG_HOME/promptmux/prompts.json`
pub fn default_registry_path() -> Result<PathBuf, ApiError> {
    Ok(app_config_dir()?.join(REGISTRY_FILE))
}
