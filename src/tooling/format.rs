//! Text formatting for registry listings, selections, and diagnostics.

use crate::prompt::PromptConfig;
use crate::provider::ChatMessage;
use crate::validation::ValidationResult;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Truncate long prompts for table cells.
fn preview(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or("");
    let mut out: String = first_line.chars().take(max_chars).collect();
    if first_line.chars().count() > max_chars || text.lines().nth(1).is_some() {
        out.push_str("...");
    }
    out
}

/// One row per intent: version count and how many are enabled.
pub fn format_intents_text(rows: &[(&str, &[PromptConfig])]) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Intents"));
    if rows.is_empty() {
        out.push_str("No intents registered.\n\nUse 'promptmux init' to add the presets.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Intent", "Versions", "Enabled", "Total weight"]);
    for (intent, configs) in rows {
        let enabled: Vec<&PromptConfig> = configs.iter().filter(|c| c.enabled).collect();
        let weight: u64 = enabled.iter().map(|c| u64::from(c.weight)).sum();
        table.add_row(vec![
            intent.to_string(),
            configs.len().to_string(),
            enabled.len().to_string(),
            weight.to_string(),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));
    out.push_str(&format!("Total: {} intent(s)\n", rows.len()));
    out
}

/// All versions of one intent.
pub fn format_configs_text(intent: &str, configs: &[PromptConfig]) -> String {
    let mut out = format!(
        "{}\n\n",
        format_section_heading(&format!("Intent: {}", intent))
    );
    if configs.is_empty() {
        out.push_str("No versions registered.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec![
        "Version", "Name", "Weight", "Enabled", "History", "Prompt",
    ]);
    for config in configs {
        table.add_row(vec![
            config.version.clone(),
            config.name.clone(),
            config.weight.to_string(),
            yes_no(config.enabled).to_string(),
            yes_no(config.include_history).to_string(),
            preview(&config.system_prompt, 40),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_config_detail_text(config: &PromptConfig) -> String {
    let mut out = format!("{}\n\n", format_section_heading(&config.label()));
    out.push_str(&format!("  Name: {}\n", config.name));
    out.push_str(&format!("  Weight: {}\n", config.weight));
    out.push_str(&format!("  Enabled: {}\n", yes_no(config.enabled)));
    out.push_str(&format!(
        "  Include history: {}\n",
        yes_no(config.include_history)
    ));
    if !config.metadata.is_empty() {
        out.push_str("  Metadata:\n");
        for (key, value) in &config.metadata {
            out.push_str(&format!("    {}: {}\n", key, value));
        }
    }
    out.push_str("\nSystem prompt:\n");
    for line in config.system_prompt.lines() {
        out.push_str(&format!("  {}\n", line));
    }
    out
}

/// Selection counts per version, in registry order.
pub fn format_tally_text(intent: &str, draws: usize, tally: &[(&PromptConfig, usize)]) -> String {
    let mut out = format!(
        "{}\n\n",
        format_section_heading(&format!("Selection for '{}' ({} draws)", intent, draws))
    );
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Version", "Name", "Weight", "Picked", "Share"]);
    for (config, count) in tally {
        let share = if draws == 0 {
            0.0
        } else {
            *count as f64 * 100.0 / draws as f64
        };
        table.add_row(vec![
            config.version.clone(),
            config.name.clone(),
            config.weight.to_string(),
            count.to_string(),
            format!("{:.1}%", share),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_messages_text(messages: &[ChatMessage]) -> String {
    let mut out = String::new();
    for message in messages {
        out.push_str(&format!("[{}]\n", message.role.bold()));
        out.push_str(&message.content);
        out.push_str("\n\n");
    }
    out
}

/// Per-config diagnostics followed by a summary line.
pub fn format_validation_text(results: &[ValidationResult]) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Prompt validation"));
    if results.is_empty() {
        out.push_str("Nothing to validate.\n");
        return out;
    }
    for result in results {
        let status = if result.is_valid() {
            format!("{}", "ok".green())
        } else {
            format!("{}", "invalid".red())
        };
        out.push_str(&format!(
            "{} [{}] {}/{} checks\n",
            result.subject,
            status,
            result.passed_checks(),
            result.total_checks()
        ));
        for (description, passed) in &result.checks {
            if !passed {
                out.push_str(&format!("    failed: {}\n", description));
            }
        }
        for error in &result.errors {
            out.push_str(&format!("    error: {}\n", error));
        }
        for warning in &result.warnings {
            out.push_str(&format!("    warning: {}\n", warning));
        }
    }
    let invalid = results.iter().filter(|r| !r.is_valid()).count();
    out.push_str(&format!(
        "\nSummary: {} valid, {} invalid (out of {} total)\n",
        results.len() - invalid,
        invalid,
        results.len()
    ));
    out
}

/// Readiness of the configured chat provider, appended to `providers`.
pub fn format_provider_check_text(result: &ValidationResult) -> String {
    let status = if result.is_valid() {
        format!("{}", "ready".green())
    } else {
        format!("{}", "not ready".red())
    };
    let mut out = format!("\nConfigured provider: {} [{}]\n", result.subject, status);
    for (description, passed) in &result.checks {
        if !passed {
            out.push_str(&format!("    failed: {}\n", description));
        }
    }
    for error in &result.errors {
        out.push_str(&format!("    error: {}\n", error));
    }
    out
}

/// One row per input text with its vector size and L2 norm.
pub fn format_embeddings_text(model: &str, texts: &[String], vectors: &[Vec<f32>]) -> String {
    let mut out = format!(
        "{}\n\n",
        format_section_heading(&format!("Embeddings ({})", model))
    );
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Text", "Dims", "Norm"]);
    for (text, vector) in texts.iter().zip(vectors) {
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        table.add_row(vec![
            preview(text, 40),
            vector.len().to_string(),
            format!("{:.4}", norm),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out.push_str(&format!("Embedded {} text(s)\n", vectors.len()));
    out
}
