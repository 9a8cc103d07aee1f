use crate::error::ApiError;
use crate::provider::catalog::{find_chat_provider, CHAT_PROVIDERS, EMBEDDING_PROVIDERS};
use crate::validation::ValidationResult;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;

pub struct ProviderDiagnosticsService;

impl ProviderDiagnosticsService {
    /// Describe whether the API key variable is present.
    pub fn api_key_status(env_key: &str) -> &'static str {
        match std::env::var(env_key) {
            Ok(value) if !value.is_empty() => "Set (from environment)",
            _ => "Not set",
        }
    }

    /// Check that a chat provider is known and has credentials.
    pub fn validate_chat_provider(provider_name: &str) -> Result<ValidationResult, ApiError> {
        let mut result = ValidationResult::new(provider_name.to_string());
        let Some(spec) = find_chat_provider(provider_name) else {
            result.add_error(format!("Unknown provider: {}", provider_name));
            return Ok(result);
        };
        result.add_check("Provider is in catalog", true);
        result.add_check(
            "Default model is listed",
            spec.models.contains(&spec.default_model),
        );
        if Self::api_key_status(spec.env_key) == "Not set" {
            result.add_error(format!("Missing API key: set {}", spec.env_key));
        } else {
            result.add_check("API key present", true);
        }
        Ok(result)
    }

    /// Render the provider catalog as a table.
    pub fn list_providers_text(embeddings: bool) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        let mut out = String::new();
        if embeddings {
            out.push_str("Embedding providers:\n");
            table.set_header(vec![
                "Provider",
                "Env var",
                "API key",
                "Default model",
                "Dims",
                "Models",
            ]);
            for spec in EMBEDDING_PROVIDERS {
                table.add_row(vec![
                    spec.name.to_string(),
                    spec.env_key.to_string(),
                    Self::api_key_status(spec.env_key).to_string(),
                    spec.default_model.to_string(),
                    spec.dimensions.to_string(),
                    spec.models.join(", "),
                ]);
            }
        } else {
            out.push_str("Chat providers:\n");
            table.set_header(vec!["Provider", "Env var", "API key", "Default model", "Models"]);
            for spec in CHAT_PROVIDERS {
                table.add_row(vec![
                    spec.name.to_string(),
                    spec.env_key.to_string(),
                    Self::api_key_status(spec.env_key).to_string(),
                    spec.default_model.to_string(),
                    spec.models.join(", "),
                ]);
            }
        }
        out.push_str(&format!("{}\n", table));
        out
    }
}
