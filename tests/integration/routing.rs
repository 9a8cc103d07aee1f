use crate::support::ScriptedModel;
use promptmux::prompt::{default_registry, PromptInput, SessionHistoryStore};
use promptmux::provider::{ChatModel, MessageRole};
use promptmux::{PromptConfig, PromptRegistry};
use std::sync::Arc;

#[tokio::test]
async fn routes_known_intent_to_its_prompt() {
    let model = ScriptedModel::shared();
    let mut registry = default_registry();

    let chain = registry
        .route("aftersale", model.clone(), Some("general"))
        .unwrap();
    assert_eq!(chain.intent(), "aftersale");

    let reply = chain
        .invoke(&PromptInput::question("How do I return an item?"))
        .await
        .unwrap();
    assert!(reply.content.starts_with("You are a patient after-sales support agent."));
    assert!(reply.content.ends_with("|How do I return an item?"));
}

#[tokio::test]
async fn unknown_intent_falls_back_to_general() {
    let model = ScriptedModel::shared();
    let mut registry = default_registry();

    let chain = registry
        .route("weather", model.clone(), Some("general"))
        .unwrap();
    assert_eq!(chain.intent(), "general");
    chain.invoke(&PromptInput::question("Sunny?")).await.unwrap();
    assert_eq!(model.call_count(), 1);
}

#[test]
fn fully_disabled_intent_falls_back() {
    let model: Arc<dyn ChatModel> = ScriptedModel::shared();
    let mut registry = default_registry();
    registry.register(PromptConfig::new("beta", "Beta", "beta").with_enabled(false));

    let chain = registry.route("beta", model, Some("general")).unwrap();
    assert_eq!(chain.intent(), "general");
}

#[test]
fn chain_building_makes_no_model_call() {
    let model = ScriptedModel::shared();
    let mut registry = default_registry();
    registry.get_chain("technical", model.clone(), None).unwrap();
    registry.route("missing", model.clone(), Some("technical")).unwrap();
    assert_eq!(model.call_count(), 0);
}

#[test]
fn route_without_any_match_names_both_intents() {
    let model = ScriptedModel::shared();
    let mut registry = PromptRegistry::new();
    let err = registry
        .route("missing_intent", model, Some("also_missing"))
        .unwrap_err();
    assert!(err.is_not_found());
    let message = err.to_string();
    assert!(message.contains("missing_intent"));
    assert!(message.contains("also_missing"));
}

#[tokio::test]
async fn history_aware_version_sees_previous_turns() {
    let model = ScriptedModel::shared();
    let mut registry = PromptRegistry::new();
    registry.register(
        PromptConfig::new("tutor", "Math", "You are a math teacher.").with_history(true),
    );
    let store = SessionHistoryStore::new();
    let chain = registry.get_chain("tutor", model.clone(), None).unwrap();

    chain
        .invoke_with_history(&store, "s1", "What is 2 + 2?")
        .await
        .unwrap();
    chain
        .invoke_with_history(&store, "s1", "Double it.")
        .await
        .unwrap();
    chain
        .invoke_with_history(&store, "s2", "Fresh start")
        .await
        .unwrap();

    let calls = model.calls.lock();
    let roles: Vec<MessageRole> = calls[1].iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::System,
            MessageRole::Human,
            MessageRole::Ai,
            MessageRole::Human
        ]
    );
    assert_eq!(calls[2].len(), 2);
}
