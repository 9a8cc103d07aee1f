use crate::support::{cli_context, storage_path, CountingEmbedder, ScriptedModel};
use promptmux::config::AppConfig;
use promptmux::tooling::cli::{CliContext, Commands, OutputFormat, MAX_PICK_COUNT};
use promptmux::{ApiError, PromptRegistry};
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;

fn register(intent: &str, name: &str, version: &str, weight: u32) -> Commands {
    Commands::Register {
        intent: intent.to_string(),
        name: name.to_string(),
        system_prompt: format!("You are the {} prompt.", name),
        version: version.to_string(),
        weight,
        history: false,
        disabled: false,
        meta: Vec::new(),
    }
}

#[test]
fn init_writes_presets_and_refuses_to_clobber() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp);

    let output = cli.execute(&Commands::Init { force: false }).unwrap();
    assert!(output.contains("general, presale, aftersale, technical"));
    assert!(storage_path(&temp).exists());

    let err = cli.execute(&Commands::Init { force: false }).unwrap_err();
    assert!(matches!(err, ApiError::ConfigError(_)));

    cli.execute(&Commands::Init { force: true }).unwrap();
    let reloaded = PromptRegistry::with_storage_path(storage_path(&temp)).unwrap();
    assert_eq!(reloaded.len(), 4);
}

#[test]
fn register_persists_and_replaces_by_version() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp);

    cli.execute(&register("greeting", "formal", "formal", 50)).unwrap();
    cli.execute(&register("greeting", "casual", "casual", 50)).unwrap();
    let output = cli
        .execute(&register("greeting", "formal-v2", "formal", 70))
        .unwrap();
    assert!(output.contains("greeting@formal"));

    let reloaded = PromptRegistry::with_storage_path(storage_path(&temp)).unwrap();
    let configs = reloaded.configs("greeting").unwrap();
    assert_eq!(configs.len(), 2);
    assert_eq!(configs[0].name, "formal-v2");
    assert_eq!(configs[0].weight, 70);
}

#[test]
fn register_reports_degraded_inputs_but_keeps_them() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp);

    let output = cli.execute(&register("odd", "heavy", "1", 250)).unwrap();
    assert!(output.contains("warning:"));
    assert!(output.contains("250"));
    assert_eq!(
        cli.registry().read().configs("odd").unwrap()[0].weight,
        250
    );
}

#[test]
fn register_reports_failed_checks() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp);

    let output = cli
        .execute(&Commands::Register {
            intent: "".to_string(),
            name: "name".to_string(),
            system_prompt: "  ".to_string(),
            version: "1.0".to_string(),
            weight: 100,
            history: false,
            disabled: false,
            meta: Vec::new(),
        })
        .unwrap();
    assert!(output.contains("check failed: Intent is not empty"));
    assert!(output.contains("check failed: System prompt"));
    assert!(!output.contains("check failed: Name is not empty"));
}

#[test]
fn register_parses_metadata_flags() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp);
    cli.execute(&Commands::Register {
        intent: "presale".to_string(),
        name: "Sales".to_string(),
        system_prompt: "Sell.".to_string(),
        version: "1.0".to_string(),
        weight: 100,
        history: true,
        disabled: true,
        meta: vec!["owner=growth".to_string(), "max_turns=3".to_string()],
    })
    .unwrap();

    let registry = cli.registry();
    let guard = registry.read();
    let config = &guard.configs("presale").unwrap()[0];
    assert!(!config.enabled);
    assert!(config.include_history);
    assert_eq!(config.metadata["owner"], "growth");
    assert_eq!(config.metadata["max_turns"], 3);
}

#[test]
fn unregister_version_then_intent() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp);
    cli.execute(&register("greeting", "formal", "formal", 50)).unwrap();
    cli.execute(&register("greeting", "casual", "casual", 50)).unwrap();

    cli.execute(&Commands::Unregister {
        intent: "greeting".to_string(),
        version: Some("formal".to_string()),
    })
    .unwrap();
    let reloaded = PromptRegistry::with_storage_path(storage_path(&temp)).unwrap();
    assert_eq!(reloaded.configs("greeting").unwrap().len(), 1);

    cli.execute(&Commands::Unregister {
        intent: "greeting".to_string(),
        version: None,
    })
    .unwrap();
    let err = cli
        .execute(&Commands::Unregister {
            intent: "greeting".to_string(),
            version: None,
        })
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn seeded_pick_is_reproducible() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp);
    cli.execute(&register("greeting", "formal", "formal", 50)).unwrap();
    cli.execute(&register("greeting", "casual", "casual", 50)).unwrap();

    let pick = Commands::Pick {
        intent: "greeting".to_string(),
        count: 200,
        seed: Some(99),
    };
    let first = cli.execute(&pick).unwrap();
    let second = cli.execute(&pick).unwrap();
    assert_eq!(first, second);
    assert!(first.contains("formal"));
    assert!(first.contains("casual"));
    assert!(first.contains("200 draws"));
}

#[test]
fn pick_unknown_intent_is_not_found() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp);
    let err = cli
        .execute(&Commands::Pick {
            intent: "nope".to_string(),
            count: 1,
            seed: None,
        })
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn pick_rejects_absurd_counts() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp);
    cli.execute(&Commands::Init { force: false }).unwrap();

    for count in [MAX_PICK_COUNT + 1, usize::MAX] {
        let err = cli
            .execute(&Commands::Pick {
                intent: "general".to_string(),
                count,
                seed: None,
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationFailed(_)));
    }
}

#[test]
fn pick_tally_skips_disabled_versions() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp);
    cli.execute(&register("greeting", "formal", "formal", 70)).unwrap();
    cli.execute(&register("greeting", "casual", "casual", 30)).unwrap();
    let mut retired = register("greeting", "retired", "retired", 100);
    if let Commands::Register { disabled, .. } = &mut retired {
        *disabled = true;
    }
    cli.execute(&retired).unwrap();

    let output = cli
        .execute(&Commands::Pick {
            intent: "greeting".to_string(),
            count: 500,
            seed: Some(4),
        })
        .unwrap();
    assert!(output.contains("500 draws"));
    assert!(!output.contains("retired"));

    let single = cli
        .execute(&Commands::Pick {
            intent: "greeting".to_string(),
            count: 1,
            seed: Some(4),
        })
        .unwrap();
    assert!(single.starts_with("Picked greeting@"));
}

#[test]
fn render_prints_system_then_question() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp);
    cli.execute(&Commands::Init { force: false }).unwrap();

    let output = cli
        .execute(&Commands::Render {
            intent: "technical".to_string(),
            question: "How do Python decorators work?".to_string(),
            version: None,
        })
        .unwrap();
    let system_at = output.find("technical support engineer").unwrap();
    let question_at = output.find("How do Python decorators work?").unwrap();
    assert!(system_at < question_at);
}

#[test]
fn validate_flags_broken_templates() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp);
    cli.execute(&Commands::Register {
        intent: "broken".to_string(),
        name: "Broken".to_string(),
        system_prompt: "Unclosed {brace".to_string(),
        version: "1.0".to_string(),
        weight: 100,
        history: false,
        disabled: false,
        meta: Vec::new(),
    })
    .unwrap();
    cli.execute(&register("fine", "fine", "1.0", 100)).unwrap();

    let output = cli.execute(&Commands::Validate { intent: None }).unwrap();
    assert!(output.contains("1 valid, 1 invalid (out of 2 total)"));

    let only_fine = cli
        .execute(&Commands::Validate {
            intent: Some("fine".to_string()),
        })
        .unwrap();
    assert!(only_fine.contains("1 valid, 0 invalid"));
}

#[test]
fn ask_routes_through_injected_model_with_fallback() {
    let temp = TempDir::new().unwrap();
    let model = ScriptedModel::shared();
    let cli = cli_context(&temp).with_chat_model(model.clone());
    cli.execute(&Commands::Init { force: false }).unwrap();

    let output = cli
        .execute(&Commands::Ask {
            intent: "weather".to_string(),
            question: "Will it rain?".to_string(),
            default_intent: None,
            provider: None,
            model: None,
        })
        .unwrap();
    assert!(output.starts_with("You are a friendly AI assistant."));
    assert!(output.trim_end().ends_with("|Will it rain?"));
    assert_eq!(model.call_count(), 1);
}

#[test]
fn ask_without_any_intent_fails_before_calling_model() {
    let temp = TempDir::new().unwrap();
    let model = ScriptedModel::shared();
    let cli = cli_context(&temp).with_chat_model(model.clone());

    let err = cli
        .execute(&Commands::Ask {
            intent: "weather".to_string(),
            question: "?".to_string(),
            default_intent: Some("fallback".to_string()),
            provider: None,
            model: None,
        })
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn ask_inside_a_runtime_is_an_error() {
    let temp = TempDir::new().unwrap();
    let model = ScriptedModel::shared();
    let cli = cli_context(&temp).with_chat_model(model.clone());
    cli.execute(&Commands::Init { force: false }).unwrap();

    let err = cli
        .execute(&Commands::Ask {
            intent: "general".to_string(),
            question: "Hello?".to_string(),
            default_intent: None,
            provider: None,
            model: None,
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::ProviderError(_)));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn chat_inside_a_runtime_is_an_error() {
    let temp = TempDir::new().unwrap();
    let model = ScriptedModel::shared();
    let cli = cli_context(&temp).with_chat_model(model.clone());
    cli.execute(&Commands::Init { force: false }).unwrap();

    let mut transcript = Vec::new();
    let result = cli.run_chat(
        "general",
        "s",
        None,
        None,
        Cursor::new("hi\n"),
        &mut transcript,
    );
    assert!(result.is_err());
    assert_eq!(model.call_count(), 0);
}

#[test]
fn chat_history_respects_configured_window() {
    let temp = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.llm.history_window = Some(2);
    let model = ScriptedModel::shared();
    let cli = CliContext::with_config(config, Some(storage_path(&temp)))
        .unwrap()
        .with_chat_model(model.clone());
    let mut tutor = register("tutor", "Math", "1.0", 100);
    if let Commands::Register { history, .. } = &mut tutor {
        *history = true;
    }
    cli.execute(&tutor).unwrap();

    let input = Cursor::new("one\ntwo\nthree\n");
    let mut transcript = Vec::new();
    cli.run_chat("tutor", "w", None, None, input, &mut transcript)
        .unwrap();

    let history = cli.sessions().history("w");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content, "three");
    // system + two windowed messages + the new question
    assert_eq!(model.calls.lock()[2].len(), 4);
}

#[test]
fn embed_uses_injected_model() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp).with_embedding_model(Arc::new(CountingEmbedder));

    let output = cli
        .execute(&Commands::Embed {
            texts: vec!["hello".to_string(), "sky".to_string()],
            provider: None,
            model: None,
            format: OutputFormat::Json,
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["model"], "counting");
    assert_eq!(parsed["dimensions"], 3);
    assert_eq!(parsed["embeddings"][0][0], 5.0);
    assert_eq!(parsed["embeddings"][1][1], 0.0);

    let text = cli
        .execute(&Commands::Embed {
            texts: vec!["hello".to_string()],
            provider: None,
            model: None,
            format: OutputFormat::Text,
        })
        .unwrap();
    assert!(text.contains("Embedded 1 text(s)"));
}

#[test]
fn embed_with_unknown_provider_fails() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp);
    let err = cli
        .execute(&Commands::Embed {
            texts: vec!["x".to_string()],
            provider: Some("nope".to_string()),
            model: None,
            format: OutputFormat::Text,
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::ProviderNotConfigured(_)));
}

#[test]
fn chat_loop_threads_history_until_exit() {
    let temp = TempDir::new().unwrap();
    let model = ScriptedModel::shared();
    let cli: CliContext = cli_context(&temp).with_chat_model(model.clone());
    cli.execute(&Commands::Register {
        intent: "tutor".to_string(),
        name: "Math".to_string(),
        system_prompt: "You are a math teacher.".to_string(),
        version: "1.0".to_string(),
        weight: 100,
        history: true,
        disabled: false,
        meta: Vec::new(),
    })
    .unwrap();

    let input = Cursor::new("What is 1 + 1?\nTimes 3?\nexit\nignored\n");
    let mut transcript = Vec::new();
    let summary = cli
        .run_chat("tutor", "user_001", None, None, input, &mut transcript)
        .unwrap();

    assert!(summary.contains("2 turn(s)"));
    assert_eq!(model.call_count(), 2);
    assert_eq!(model.calls.lock()[1].len(), 4);
    assert_eq!(cli.sessions().history("user_001").len(), 4);
    let transcript = String::from_utf8(transcript).unwrap();
    assert!(transcript.contains("|Times 3?"));
}

#[test]
fn intents_json_lists_versions() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp);
    cli.execute(&register("greeting", "formal", "formal", 50)).unwrap();
    cli.execute(&register("greeting", "casual", "casual", 50)).unwrap();

    let output = cli
        .execute(&Commands::Intents {
            format: OutputFormat::Json,
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["total"], 1);
    assert_eq!(parsed["intents"][0]["versions"][1], "casual");
}

#[test]
fn providers_lists_catalog() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp);
    let chat = cli.execute(&Commands::Providers { embeddings: false }).unwrap();
    assert!(chat.contains("deepseek"));
    let embeddings = cli.execute(&Commands::Providers { embeddings: true }).unwrap();
    assert!(embeddings.contains("text-embedding-v3"));
    assert!(!embeddings.contains("Configured provider"));
}

#[test]
fn providers_checks_configured_provider() {
    let temp = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.llm.provider = Some("Moonshot".to_string());
    let cli = CliContext::with_config(config, Some(storage_path(&temp))).unwrap();

    let output = cli.execute(&Commands::Providers { embeddings: false }).unwrap();
    assert!(output.contains("Configured provider: moonshot"));
}
