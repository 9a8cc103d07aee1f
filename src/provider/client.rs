//! Model traits and OpenAI-compatible HTTP clients.

use crate::error::ApiError;
use crate::provider::message::{ChatMessage, ChatResponse, CompletionOptions, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A chat model the router can hand rendered messages to.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        options: &CompletionOptions,
    ) -> Result<ChatResponse, ApiError>;

    /// Model identifier, for logs and CLI output.
    fn model_name(&self) -> &str;

    /// Options applied when the caller does not override them.
    fn default_options(&self) -> CompletionOptions {
        CompletionOptions::default()
    }
}

/// An embedding model.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        let mut vectors = self.embed_documents(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| ApiError::ProviderError("Embedding response was empty".to_string()))
    }

    fn model_name(&self) -> &str;
}

fn build_http_client(timeout: Duration) -> Result<Client, ApiError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ApiError::ProviderError(format!("Failed to create HTTP client: {}", e)))
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 | 403 => ApiError::ProviderNotConfigured(format!(
            "Authentication rejected ({}): {}",
            status, body
        )),
        _ => ApiError::ProviderError(format!("API error {}: {}", status, body)),
    })
}

/// Chat client for any `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    provider: String,
    base_url: String,
    api_key: String,
    model: String,
    default_options: CompletionOptions,
    timeout: Duration,
    http: Client,
}

impl OpenAiCompatibleClient {
    pub fn new(
        provider: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            provider: provider.into(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            default_options: CompletionOptions::default(),
            timeout: DEFAULT_TIMEOUT,
            http: build_http_client(DEFAULT_TIMEOUT)?,
        })
    }

    pub fn with_default_options(mut self, options: CompletionOptions) -> Self {
        self.default_options = options;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ApiError> {
        self.http = build_http_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        options: &CompletionOptions,
    ) -> ChatCompletionRequest<'a> {
        let options = options.merged_over(&self.default_options);
        ChatCompletionRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.wire_name(),
                    content: &m.content,
                })
                .collect(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            top_p: options.top_p,
            stop: options.stop,
            stream: false,
        }
    }
}

impl std::fmt::Debug for OpenAiCompatibleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleClient")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleClient {
    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        options: &CompletionOptions,
    ) -> Result<ChatResponse, ApiError> {
        let url = endpoint(&self.base_url, "chat/completions");
        let body = self.build_request(&messages, options);

        tracing::debug!(
            provider = %self.provider,
            model = %self.model,
            messages = messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;
        let parsed: ChatCompletionResponse = response.json().await?;
        parse_chat_response(parsed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn default_options(&self) -> CompletionOptions {
        self.default_options.clone()
    }
}

fn parse_chat_response(parsed: ChatCompletionResponse) -> Result<ChatResponse, ApiError> {
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::ProviderError("Response contained no choices".to_string()))?;
    Ok(ChatResponse {
        content: choice.message.content.unwrap_or_default(),
        model: parsed.model,
        finish_reason: choice.finish_reason,
        usage: parsed.usage,
    })
}

/// Embedding client for any `/embeddings` endpoint.
#[derive(Clone)]
pub struct OpenAiCompatibleEmbeddings {
    provider: String,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: Option<usize>,
    http: Client,
}

impl OpenAiCompatibleEmbeddings {
    pub fn new(
        provider: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            provider: provider.into(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            dimensions: None,
            http: build_http_client(DEFAULT_TIMEOUT)?,
        })
    }

    /// Request a specific vector size (providers that support it).
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }
}

impl std::fmt::Debug for OpenAiCompatibleEmbeddings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleEmbeddings")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EmbeddingModel for OpenAiCompatibleEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let url = endpoint(&self.base_url, "embeddings");
        let body = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: self.dimensions,
        };

        tracing::debug!(
            provider = %self.provider,
            model = %self.model,
            inputs = texts.len(),
            "Sending embedding request"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;
        let parsed: EmbeddingResponse = response.json().await?;
        parse_embedding_response(parsed, texts.len())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn parse_embedding_response(
    mut parsed: EmbeddingResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, ApiError> {
    if parsed.data.len() != expected {
        return Err(ApiError::ProviderError(format!(
            "Expected {} embeddings, got {}",
            expected,
            parsed.data.len()
        )));
    }
    parsed.data.sort_by_key(|d| d.index);
    Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}
