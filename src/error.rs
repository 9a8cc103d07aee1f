//! Error types shared across the registry, provider, and CLI layers.

use thiserror::Error;

/// Errors surfaced by promptmux operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Requested intent/version has no enabled config and no usable fallback.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid configuration (e.g. no storage path for save).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Malformed or schema-violating JSON.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Template could not be rendered with the supplied input.
    #[error("Template error: {0}")]
    TemplateError(String),

    /// Provider is unknown or lacks credentials.
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// Provider call failed.
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::ProviderError(format!("Request timed out: {}", err))
        } else {
            ApiError::ProviderError(format!("HTTP request failed: {}", err))
        }
    }
}

impl ApiError {
    /// Whether the error came from a missing intent rather than a broken setup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}
