use crate::support::cli_context;
use promptmux::tooling::cli::{Commands, OutputFormat};
use tempfile::TempDir;

#[test]
fn show_json_contract_has_record_fields() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp);
    cli.execute(&Commands::Init { force: false }).unwrap();

    let output = cli
        .execute(&Commands::Show {
            intent: "presale".to_string(),
            version: None,
            format: OutputFormat::Json,
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    let record = &parsed.as_array().unwrap()[0];
    for field in [
        "intent",
        "name",
        "system_prompt",
        "version",
        "weight",
        "enabled",
        "include_history",
        "metadata",
    ] {
        assert!(record.get(field).is_some(), "missing {}", field);
    }
}

#[test]
fn show_single_version_includes_disabled() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp);
    cli.execute(&Commands::Register {
        intent: "beta".to_string(),
        name: "Beta".to_string(),
        system_prompt: "Beta prompt".to_string(),
        version: "b".to_string(),
        weight: 10,
        history: false,
        disabled: true,
        meta: Vec::new(),
    })
    .unwrap();

    let output = cli
        .execute(&Commands::Show {
            intent: "beta".to_string(),
            version: Some("b".to_string()),
            format: OutputFormat::Json,
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["enabled"], false);
    assert_eq!(parsed["version"], "b");

    let missing = cli.execute(&Commands::Show {
        intent: "beta".to_string(),
        version: Some("zzz".to_string()),
        format: OutputFormat::Text,
    });
    assert!(missing.unwrap_err().is_not_found());
}

#[test]
fn intents_text_on_empty_registry_suggests_init() {
    let temp = TempDir::new().unwrap();
    let cli = cli_context(&temp);
    let output = cli
        .execute(&Commands::Intents {
            format: OutputFormat::Text,
        })
        .unwrap();
    assert!(output.contains("No intents registered."));
}
