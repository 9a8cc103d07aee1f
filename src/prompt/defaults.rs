//! Preset customer-service intents.

use crate::prompt::config::PromptConfig;
use crate::prompt::registry::PromptRegistry;

/// Intent used as the routing fallback by the CLI.
pub const GENERAL_INTENT: &str = "general";

const GENERAL_PROMPT: &str =
    "You are a friendly AI assistant. Answer the user's question concisely and professionally.";

const PRESALE_PROMPT: &str = "You are a professional pre-sales consultant. Your job is to:
1. Introduce product features and strengths
2. Answer pricing and plan questions
3. Offer product comparisons and recommendations
4. Guide the customer toward a purchase decision

Stay warm and professional, and highlight the value of the product.";

const AFTERSALE_PROMPT: &str = "You are a patient after-sales support agent. Your job is to:
1. Handle return and exchange requests
2. Answer usage questions
3. Collect user feedback
4. Handle complaints and suggestions

Stay patient and empathetic, and resolve the user's problem first.";

const TECHNICAL_PROMPT: &str = "You are a professional technical support engineer. Your job is to:
1. Answer technical questions
2. Guide troubleshooting
3. Provide code examples and solutions
4. Explain technical concepts

Use clear and precise technical language, with code examples where they help.";

/// The preset configs, in registration order.
pub fn default_configs() -> Vec<PromptConfig> {
    vec![
        PromptConfig::new(GENERAL_INTENT, "General Assistant", GENERAL_PROMPT),
        PromptConfig::new("presale", "Pre-sales Consultant", PRESALE_PROMPT),
        PromptConfig::new("aftersale", "After-sales Support", AFTERSALE_PROMPT),
        PromptConfig::new("technical", "Technical Support", TECHNICAL_PROMPT),
    ]
}

/// Register the presets into an existing registry.
pub fn register_defaults(registry: &mut PromptRegistry) {
    for config in default_configs() {
        registry.register(config);
    }
}

/// A fresh registry holding only the presets.
pub fn default_registry() -> PromptRegistry {
    let mut registry = PromptRegistry::new();
    register_defaults(&mut registry);
    registry
}
