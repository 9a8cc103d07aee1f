//! Shared fixtures: temp-dir backed CLI contexts and a scripted chat model.

use async_trait::async_trait;
use parking_lot::Mutex;
use promptmux::config::AppConfig;
use promptmux::provider::{
    ChatMessage, ChatModel, ChatResponse, CompletionOptions, EmbeddingModel,
};
use promptmux::tooling::cli::CliContext;
use promptmux::ApiError;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub fn storage_path(temp: &TempDir) -> PathBuf {
    temp.path().join("prompts.json")
}

/// A context with default config whose registry lives inside `temp`.
pub fn cli_context(temp: &TempDir) -> CliContext {
    CliContext::with_config(AppConfig::default(), Some(storage_path(temp))).unwrap()
}

/// Replies `"<intent marker>|<question>"` and records every call.
#[derive(Default)]
pub struct ScriptedModel {
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        _options: &CompletionOptions,
    ) -> Result<ChatResponse, ApiError> {
        let system = messages
            .first()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let question = messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.calls.lock().push(messages);
        Ok(ChatResponse::text(format!("{}|{}", system, question)))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Embeds each text as `[len, vowels, 1.0]`.
pub struct CountingEmbedder;

#[async_trait]
impl EmbeddingModel for CountingEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        Ok(texts
            .iter()
            .map(|text| {
                let vowels = text.chars().filter(|c| "aeiou".contains(*c)).count();
                vec![text.len() as f32, vowels as f32, 1.0]
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "counting"
    }
}
