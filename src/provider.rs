//! Provider Layer
//!
//! Chat and embedding model traits, the built-in catalog of OpenAI-compatible
//! providers, and the factories that turn a provider name into a client.

pub mod catalog;
pub mod client;
pub mod diagnostics;
pub mod factory;
pub mod message;

pub use catalog::{ChatProviderSpec, EmbeddingProviderSpec, CHAT_PROVIDERS, EMBEDDING_PROVIDERS};
pub use client::{ChatModel, EmbeddingModel, OpenAiCompatibleClient, OpenAiCompatibleEmbeddings};
pub use diagnostics::ProviderDiagnosticsService;
pub use factory::{get_embeddings, get_llm, EmbeddingRequest, LlmRequest, ResolvedProvider};
pub use message::{ChatMessage, ChatResponse, CompletionOptions, MessageRole, TokenUsage};
