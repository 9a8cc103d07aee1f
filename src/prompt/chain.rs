//! A resolved template bound to a chat model.

use crate::error::ApiError;
use crate::prompt::config::PromptConfig;
use crate::prompt::history::SessionHistoryStore;
use crate::prompt::registry::build_template;
use crate::prompt::template::{ChatTemplate, PromptInput, HISTORY_VARIABLE};
use crate::provider::{ChatMessage, ChatModel, ChatResponse, CompletionOptions};
use std::sync::Arc;

/// Template + model composition returned by the router.
///
/// Building a chain performs no model call; [`PromptChain::invoke`] does.
#[derive(Clone)]
pub struct PromptChain {
    template: ChatTemplate,
    llm: Arc<dyn ChatModel>,
    options: CompletionOptions,
    intent: String,
    version: String,
}

impl PromptChain {
    pub fn new(
        template: ChatTemplate,
        llm: Arc<dyn ChatModel>,
        intent: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            template,
            llm,
            options: CompletionOptions::default(),
            intent: intent.into(),
            version: version.into(),
        }
    }

    pub(crate) fn from_config(config: &PromptConfig, llm: Arc<dyn ChatModel>) -> Self {
        Self::new(
            build_template(config),
            llm,
            config.intent.clone(),
            config.version.clone(),
        )
    }

    /// Per-chain overrides layered over the model's defaults.
    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn template(&self) -> &ChatTemplate {
        &self.template
    }

    pub fn intent(&self) -> &str {
        &self.intent
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    pub fn render(&self, input: &PromptInput) -> Result<Vec<ChatMessage>, ApiError> {
        self.template.render(input)
    }

    /// Render `input` and send it to the model.
    pub async fn invoke(&self, input: &PromptInput) -> Result<ChatResponse, ApiError> {
        let messages = self.render(input)?;
        let options = self.options.merged_over(&self.llm.default_options());
        tracing::debug!(
            intent = %self.intent,
            version = %self.version,
            model = self.llm.model_name(),
            messages = messages.len(),
            "Invoking chain"
        );
        let response = self.llm.chat(messages, &options).await?;
        tracing::debug!(
            intent = %self.intent,
            chars = response.content.len(),
            "Chain completed"
        );
        Ok(response)
    }

    /// Invoke with the session's stored history, then record the exchange.
    ///
    /// The exchange is recorded even when the template has no history slot,
    /// so switching to a history-aware version later sees prior turns.
    pub async fn invoke_with_history(
        &self,
        store: &SessionHistoryStore,
        session_id: &str,
        question: &str,
    ) -> Result<ChatResponse, ApiError> {
        let mut input = PromptInput::question(question);
        if self.template.has_placeholder(HISTORY_VARIABLE) {
            input = input.with_history(store.history(session_id));
        }
        let response = self.invoke(&input).await?;
        store.append(
            session_id,
            [
                ChatMessage::human(question),
                ChatMessage::ai(response.content.clone()),
            ],
        );
        Ok(response)
    }
}

impl std::fmt::Debug for PromptChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptChain")
            .field("intent", &self.intent)
            .field("version", &self.version)
            .field("model", &self.llm.model_name())
            .field("template", &self.template)
            .finish()
    }
}
