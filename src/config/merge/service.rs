//! MergeService: orchestrates sources and deserializes to AppConfig.

use crate::config::sources::{environment, explicit_file, global_file};
use crate::config::AppConfig;
use config::ConfigError;
use std::path::Path;

use super::merge_policy;

pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> global file -> explicit file -> environment (highest).
    pub fn load(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        Self::finish(builder, explicit)
    }

    /// Same layering with the global file taken from `global` instead of XDG.
    pub fn load_with_global(
        global: &Path,
        explicit: Option<&Path>,
    ) -> Result<AppConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_path(builder, global)?;
        Self::finish(builder, explicit)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        explicit: Option<&Path>,
    ) -> Result<AppConfig, ConfigError> {
        let builder = match explicit {
            Some(path) => explicit_file::add_to_builder(builder, path)?,
            None => builder,
        };
        let builder = environment::add_to_builder(builder)?;
        builder.build()?.try_deserialize()
    }
}
