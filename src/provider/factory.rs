//! Provider selection: resolve a provider name, model, and API key into a client.
//!
//! Resolution order for the provider: explicit request, then the
//! `LLM_PROVIDER` / `EMBEDDING_PROVIDER` environment variable, then the
//! catalog default. API keys are always read from the provider's own
//! environment variable unless the request carries one.

use crate::error::ApiError;
use crate::provider::catalog::{
    chat_provider_names, embedding_provider_names, find_chat_provider, find_embedding_provider,
    DEFAULT_CHAT_PROVIDER, DEFAULT_EMBEDDING_PROVIDER,
};
use crate::provider::client::{OpenAiCompatibleClient, OpenAiCompatibleEmbeddings};
use crate::provider::message::CompletionOptions;
use std::time::Duration;

pub const LLM_PROVIDER_ENV: &str = "LLM_PROVIDER";
pub const EMBEDDING_PROVIDER_ENV: &str = "EMBEDDING_PROVIDER";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Parameters for [`get_llm`].
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub api_key: Option<String>,
    /// HTTP timeout; the client default applies when unset.
    pub timeout: Option<Duration>,
}

impl Default for LlmRequest {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            api_key: None,
            timeout: None,
        }
    }
}

impl LlmRequest {
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Parameters for [`get_embeddings`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingRequest {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub dimensions: Option<usize>,
    pub api_key: Option<String>,
}

/// Fully resolved provider settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProvider {
    pub provider: String,
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

fn pick_name(explicit: Option<&str>, env_value: Option<String>, default: &str) -> String {
    explicit
        .map(str::to_string)
        .filter(|s| !s.trim().is_empty())
        .or(env_value.filter(|s| !s.trim().is_empty()))
        .unwrap_or_else(|| default.to_string())
        .trim()
        .to_lowercase()
}

fn require_key(
    explicit: Option<&str>,
    env_key: &str,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<String, ApiError> {
    if let Some(key) = explicit.filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    env(env_key).filter(|k| !k.is_empty()).ok_or_else(|| {
        ApiError::ProviderNotConfigured(format!("Set the {} environment variable", env_key))
    })
}

/// Resolve a chat provider using `env` for variable lookups.
pub fn resolve_llm_with(
    request: &LlmRequest,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedProvider, ApiError> {
    let name = pick_name(
        request.provider.as_deref(),
        env(LLM_PROVIDER_ENV),
        DEFAULT_CHAT_PROVIDER,
    );
    let spec = find_chat_provider(&name).ok_or_else(|| {
        ApiError::ProviderNotConfigured(format!(
            "Unsupported provider: {} (available: {})",
            name,
            chat_provider_names().join(", ")
        ))
    })?;
    let api_key = require_key(request.api_key.as_deref(), spec.env_key, &env)?;
    let model = request
        .model
        .clone()
        .unwrap_or_else(|| spec.default_model.to_string());
    if !spec.models.contains(&model.as_str()) {
        tracing::warn!(provider = spec.name, model = %model, "Model not in provider catalog");
    }
    Ok(ResolvedProvider {
        provider: spec.name.to_string(),
        base_url: spec.base_url.to_string(),
        model,
        api_key,
    })
}

/// Resolve an embedding provider using `env` for variable lookups.
pub fn resolve_embeddings_with(
    request: &EmbeddingRequest,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedProvider, ApiError> {
    let name = pick_name(
        request.provider.as_deref(),
        env(EMBEDDING_PROVIDER_ENV),
        DEFAULT_EMBEDDING_PROVIDER,
    );
    let spec = find_embedding_provider(&name).ok_or_else(|| {
        ApiError::ProviderNotConfigured(format!(
            "Unsupported embedding provider: {} (available: {})",
            name,
            embedding_provider_names().join(", ")
        ))
    })?;
    let api_key = require_key(request.api_key.as_deref(), spec.env_key, &env)?;
    Ok(ResolvedProvider {
        provider: spec.name.to_string(),
        base_url: spec.base_url.to_string(),
        model: request
            .model
            .clone()
            .unwrap_or_else(|| spec.default_model.to_string()),
        api_key,
    })
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Chat provider name `get_llm` would use for `explicit`.
pub fn configured_chat_provider(explicit: Option<&str>) -> String {
    pick_name(explicit, process_env(LLM_PROVIDER_ENV), DEFAULT_CHAT_PROVIDER)
}

/// Build a chat client from the process environment.
pub fn get_llm(request: &LlmRequest) -> Result<OpenAiCompatibleClient, ApiError> {
    let resolved = resolve_llm_with(request, process_env)?;
    tracing::info!(
        provider = %resolved.provider,
        model = %resolved.model,
        "Resolved chat provider"
    );
    let client = OpenAiCompatibleClient::new(
        resolved.provider,
        resolved.base_url,
        resolved.api_key,
        resolved.model,
    )?
    .with_default_options(CompletionOptions {
        temperature: Some(request.temperature),
        max_tokens: request.max_tokens,
        ..Default::default()
    });
    match request.timeout {
        Some(timeout) => client.with_timeout(timeout),
        None => Ok(client),
    }
}

/// Build an embedding client from the process environment.
pub fn get_embeddings(request: &EmbeddingRequest) -> Result<OpenAiCompatibleEmbeddings, ApiError> {
    let resolved = resolve_embeddings_with(request, process_env)?;
    tracing::info!(
        provider = %resolved.provider,
        model = %resolved.model,
        "Resolved embedding provider"
    );
    let mut client = OpenAiCompatibleEmbeddings::new(
        resolved.provider,
        resolved.base_url,
        resolved.api_key,
        resolved.model,
    )?;
    if let Some(dimensions) = request.dimensions {
        client = client.with_dimensions(dimensions);
    }
    Ok(client)
}
