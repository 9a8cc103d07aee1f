//! promptmux: intent-routed prompt registry
//!
//! Maps intent names to versioned, weighted prompt templates, selects among
//! versions for A/B testing, falls back to a default intent, persists the
//! registry as JSON, and binds the chosen template to an OpenAI-compatible
//! chat model.

pub mod config;
pub mod error;
pub mod logging;
pub mod prompt;
pub mod provider;
pub mod tooling;
pub mod validation;

pub use error::ApiError;
pub use prompt::{PromptChain, PromptConfig, PromptRegistry};
