//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::AppConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, the global file, an optional explicit file, and environment.
    pub fn load(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
        MergeService::load(explicit)
    }

    /// Load with a specific global file, bypassing XDG lookup.
    pub fn load_with_global(
        global: &Path,
        explicit: Option<&Path>,
    ) -> Result<AppConfig, ConfigError> {
        MergeService::load_with_global(global, explicit)
    }

    pub fn default() -> AppConfig {
        AppConfig::default()
    }
}
