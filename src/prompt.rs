//! Prompt Registry & Router
//!
//! Maps intent names to versioned, weighted prompt configs. Resolves an intent
//! to a chat template (optionally A/B-selected by weight), binds it to a chat
//! model, and persists the registry as a JSON snapshot.

pub mod chain;
pub mod config;
pub mod defaults;
pub mod history;
pub mod registry;
pub mod selector;
pub mod storage;
pub mod template;

pub use chain::PromptChain;
pub use config::PromptConfig;
pub use defaults::{default_registry, register_defaults, GENERAL_INTENT};
pub use history::SessionHistoryStore;
pub use registry::{DisabledPolicy, PromptRegistry, SharedPromptRegistry};
pub use storage::RegistrySnapshot;
pub use template::{ChatTemplate, PromptInput, TemplateEntry};
