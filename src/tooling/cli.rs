//! CLI Tooling
//!
//! Command-line interface over a persisted prompt registry: inspect and edit
//! intents, exercise A/B selection, render templates, and send questions to a
//! configured chat provider.

use crate::config::{AppConfig, ConfigLoader};
use crate::error::ApiError;
use crate::prompt::{
    register_defaults, PromptConfig, PromptInput, SessionHistoryStore, SharedPromptRegistry,
};
use crate::provider::factory::configured_chat_provider;
use crate::provider::{
    get_embeddings, get_llm, ChatModel, EmbeddingModel, ProviderDiagnosticsService,
};
use crate::tooling::format::{
    format_config_detail_text, format_configs_text, format_embeddings_text, format_intents_text,
    format_messages_text, format_provider_check_text, format_tally_text, format_validation_text,
};
use crate::validation::ValidationResult;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Map, Value};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Upper bound for `pick --count`.
pub const MAX_PICK_COUNT: usize = 1_000_000;

/// promptmux - intent-routed prompt registry with weighted A/B selection
#[derive(Parser)]
#[command(name = "promptmux", version)]
#[command(about = "Route intents to versioned, weighted prompt templates")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Registry JSON file (overrides registry.storage_path)
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List registered intents
    Intents {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show the versions of an intent, or one version in detail
    Show {
        intent: String,
        #[arg(long)]
        version: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Register (or replace) a prompt version and save the registry
    Register {
        intent: String,
        name: String,
        system_prompt: String,
        #[arg(long, default_value = crate::prompt::config::DEFAULT_VERSION)]
        version: String,
        #[arg(long, default_value_t = crate::prompt::config::DEFAULT_WEIGHT)]
        weight: u32,
        /// Reserve a conversation history slot
        #[arg(long)]
        history: bool,
        /// Store the version disabled
        #[arg(long)]
        disabled: bool,
        /// Metadata entry as key=value; JSON values are parsed, anything else is a string
        #[arg(long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,
    },
    /// Remove a version, or the whole intent, and save the registry
    Unregister {
        intent: String,
        #[arg(long)]
        version: Option<String>,
    },
    /// Run weighted selection and report which versions were picked
    Pick {
        intent: String,
        #[arg(long, default_value_t = 1)]
        count: usize,
        /// Seed the selector for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the messages a question renders to
    Render {
        intent: String,
        question: String,
        #[arg(long)]
        version: Option<String>,
    },
    /// Report configs that register accepted but will degrade routing
    Validate { intent: Option<String> },
    /// Write the preset intents (general, presale, aftersale, technical)
    Init {
        /// Replace presets in a registry that already has intents
        #[arg(long)]
        force: bool,
    },
    /// Route a question to an intent and ask the chat model
    Ask {
        intent: String,
        question: String,
        /// Fallback when the intent has no usable version
        #[arg(long)]
        default_intent: Option<String>,
        #[arg(long)]
        provider: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
    /// Interactive conversation with session history
    Chat {
        intent: String,
        #[arg(long, default_value = "default")]
        session: String,
        #[arg(long)]
        provider: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
    /// Embed texts with the configured embedding provider
    Embed {
        #[arg(required = true)]
        texts: Vec<String>,
        #[arg(long)]
        provider: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the built-in provider catalog
    Providers {
        #[arg(long)]
        embeddings: bool,
    },
}

/// CLI context holding the loaded config and the registry it opened.
pub struct CliContext {
    config: AppConfig,
    registry: SharedPromptRegistry,
    sessions: SessionHistoryStore,
    chat_model: Option<Arc<dyn ChatModel>>,
    embedding_model: Option<Arc<dyn EmbeddingModel>>,
}

impl CliContext {
    /// Load configuration and open the registry.
    pub fn new(config_path: Option<PathBuf>, storage: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = ConfigLoader::load(config_path.as_deref())?;
        Self::with_config(config, storage)
    }

    pub fn with_config(config: AppConfig, storage: Option<PathBuf>) -> Result<Self, ApiError> {
        let registry = config.registry.open_registry(storage)?;
        info!(
            storage = ?registry.storage_path(),
            intents = registry.len(),
            "Opened prompt registry"
        );
        let sessions = match config.llm.history_window {
            Some(window) => SessionHistoryStore::with_window(window),
            None => SessionHistoryStore::new(),
        };
        Ok(Self {
            config,
            registry: registry.into_shared(),
            sessions,
            chat_model: None,
            embedding_model: None,
        })
    }

    /// Use `llm` for `ask` and `chat` instead of resolving a provider.
    pub fn with_chat_model(mut self, llm: Arc<dyn ChatModel>) -> Self {
        self.chat_model = Some(llm);
        self
    }

    /// Use `embedder` for `embed` instead of resolving a provider.
    pub fn with_embedding_model(mut self, embedder: Arc<dyn EmbeddingModel>) -> Self {
        self.embedding_model = Some(embedder);
        self
    }

    pub fn registry(&self) -> SharedPromptRegistry {
        Arc::clone(&self.registry)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionHistoryStore {
        &self.sessions
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Intents { format } => self.handle_intents(*format),
            Commands::Show {
                intent,
                version,
                format,
            } => self.handle_show(intent, version.as_deref(), *format),
            Commands::Register {
                intent,
                name,
                system_prompt,
                version,
                weight,
                history,
                disabled,
                meta,
            } => {
                let mut config = PromptConfig::new(intent, name, system_prompt)
                    .with_version(version)
                    .with_weight(*weight)
                    .with_history(*history)
                    .with_enabled(!disabled);
                for (key, value) in parse_metadata(meta)? {
                    config = config.with_metadata(key, value);
                }
                self.handle_register(config)
            }
            Commands::Unregister { intent, version } => {
                self.handle_unregister(intent, version.as_deref())
            }
            Commands::Pick {
                intent,
                count,
                seed,
            } => self.handle_pick(intent, *count, *seed),
            Commands::Render {
                intent,
                question,
                version,
            } => self.handle_render(intent, question, version.as_deref()),
            Commands::Validate { intent } => self.handle_validate(intent.as_deref()),
            Commands::Init { force } => self.handle_init(*force),
            Commands::Ask {
                intent,
                question,
                default_intent,
                provider,
                model,
            } => self.handle_ask(
                intent,
                question,
                default_intent.as_deref(),
                provider.as_deref(),
                model.as_deref(),
            ),
            Commands::Chat {
                intent,
                session,
                provider,
                model,
            } => {
                let stdin = std::io::stdin();
                let stdout = std::io::stdout();
                self.run_chat(
                    intent,
                    session,
                    provider.as_deref(),
                    model.as_deref(),
                    stdin.lock(),
                    stdout.lock(),
                )
            }
            Commands::Embed {
                texts,
                provider,
                model,
                format,
            } => self.handle_embed(texts, provider.as_deref(), model.as_deref(), *format),
            Commands::Providers { embeddings } => self.handle_providers(*embeddings),
        }
    }

    fn handle_intents(&self, format: OutputFormat) -> Result<String, ApiError> {
        let registry = self.registry.read();
        let rows: Vec<(&str, &[PromptConfig])> = registry.iter().collect();
        match format {
            OutputFormat::Text => Ok(format_intents_text(&rows)),
            OutputFormat::Json => {
                let intents: Vec<Value> = rows
                    .iter()
                    .map(|(intent, configs)| {
                        let versions: Vec<&str> =
                            configs.iter().map(|c| c.version.as_str()).collect();
                        json!({
                            "intent": intent,
                            "versions": versions,
                            "enabled": configs.iter().filter(|c| c.enabled).count(),
                        })
                    })
                    .collect();
                to_pretty(&json!({ "intents": intents, "total": rows.len() }))
            }
        }
    }

    fn handle_show(
        &self,
        intent: &str,
        version: Option<&str>,
        format: OutputFormat,
    ) -> Result<String, ApiError> {
        let registry = self.registry.read();
        let configs = registry
            .configs(intent)
            .ok_or_else(|| ApiError::NotFound(format!("Intent not found: {}", intent)))?;

        match version {
            Some(version) => {
                // Show reads stored state, so disabled versions are visible here.
                let config = configs
                    .iter()
                    .find(|c| c.version == version)
                    .ok_or_else(|| {
                        ApiError::NotFound(format!(
                            "Version not found: {}@{}",
                            intent, version
                        ))
                    })?;
                match format {
                    OutputFormat::Text => Ok(format_config_detail_text(config)),
                    OutputFormat::Json => to_pretty(config),
                }
            }
            None => match format {
                OutputFormat::Text => Ok(format_configs_text(intent, configs)),
                OutputFormat::Json => to_pretty(&configs),
            },
        }
    }

    fn handle_register(&self, config: PromptConfig) -> Result<String, ApiError> {
        let diagnostics = config.validate();
        let label = config.label();
        let weight = config.weight;

        let mut registry = self.registry.write();
        registry.register(config);
        let path = registry.save(None)?;

        let mut out = format!(
            "Registered {} (weight {})\nSaved to {}\n",
            label,
            weight,
            path.display()
        );
        for (description, passed) in &diagnostics.checks {
            if !passed {
                out.push_str(&format!("warning: check failed: {}\n", description));
            }
        }
        for warning in diagnostics.warnings.iter().chain(diagnostics.errors.iter()) {
            out.push_str(&format!("warning: {}\n", warning));
        }
        Ok(out)
    }

    fn handle_unregister(&self, intent: &str, version: Option<&str>) -> Result<String, ApiError> {
        let mut registry = self.registry.write();
        if !registry.unregister(intent, version) {
            return Err(ApiError::NotFound(format!("Intent not found: {}", intent)));
        }
        let path = registry.save(None)?;
        let removed = match version {
            Some(version) => format!("{}@{}", intent, version),
            None => intent.to_string(),
        };
        Ok(format!("Removed {}\nSaved to {}\n", removed, path.display()))
    }

    fn handle_pick(
        &self,
        intent: &str,
        count: usize,
        seed: Option<u64>,
    ) -> Result<String, ApiError> {
        if count > MAX_PICK_COUNT {
            return Err(ApiError::ValidationFailed(format!(
                "--count must be at most {}, got {}",
                MAX_PICK_COUNT, count
            )));
        }
        let draws = count.max(1);

        let mut registry = self.registry.write();
        if let Some(seed) = seed {
            registry.reseed(seed);
        }
        let versions: Vec<String> = registry
            .configs(intent)
            .unwrap_or_default()
            .iter()
            .filter(|c| c.enabled)
            .map(|c| c.version.clone())
            .collect();

        let mut counts = vec![0usize; versions.len()];
        for _ in 0..draws {
            let picked = registry.get_config(intent, None).ok_or_else(|| {
                ApiError::NotFound(format!("No enabled version for intent: {}", intent))
            })?;
            if let Some(slot) = versions.iter().position(|v| *v == picked.version) {
                counts[slot] += 1;
            }
        }

        let enabled: Vec<&PromptConfig> = registry
            .configs(intent)
            .unwrap_or_default()
            .iter()
            .filter(|c| c.enabled)
            .collect();
        if draws == 1 {
            let picked = enabled
                .iter()
                .zip(&counts)
                .find(|(_, count)| **count == 1)
                .map(|(config, _)| *config)
                .ok_or_else(|| ApiError::NotFound(format!("Intent not found: {}", intent)))?;
            return Ok(format!(
                "Picked {} ({}, weight {})\n",
                picked.label(),
                picked.name,
                picked.weight
            ));
        }

        let tally: Vec<(&PromptConfig, usize)> = enabled.into_iter().zip(counts).collect();
        Ok(format_tally_text(intent, draws, &tally))
    }

    fn handle_render(
        &self,
        intent: &str,
        question: &str,
        version: Option<&str>,
    ) -> Result<String, ApiError> {
        let template = self
            .registry
            .write()
            .get_prompt(intent, version)
            .ok_or_else(|| ApiError::NotFound(format!("Intent not found: {}", intent)))?;
        let messages = template.render(&PromptInput::question(question))?;
        Ok(format_messages_text(&messages))
    }

    fn handle_validate(&self, intent: Option<&str>) -> Result<String, ApiError> {
        let registry = self.registry.read();
        let results: Vec<ValidationResult> = match intent {
            Some(intent) => registry
                .configs(intent)
                .ok_or_else(|| ApiError::NotFound(format!("Intent not found: {}", intent)))?
                .iter()
                .map(PromptConfig::validate)
                .collect(),
            None => registry
                .iter()
                .flat_map(|(_, configs)| configs.iter().map(PromptConfig::validate))
                .collect(),
        };
        Ok(format_validation_text(&results))
    }

    fn handle_init(&self, force: bool) -> Result<String, ApiError> {
        let mut registry = self.registry.write();
        if !registry.is_empty() && !force {
            return Err(ApiError::ConfigError(format!(
                "Registry already has {} intent(s); use --force to re-register the presets",
                registry.len()
            )));
        }
        register_defaults(&mut registry);
        let path = registry.save(None)?;
        Ok(format!(
            "Initialized presets: {}\nSaved to {}\n",
            registry.list_intents().join(", "),
            path.display()
        ))
    }

    fn chat_model(
        &self,
        provider: Option<&str>,
        model: Option<&str>,
    ) -> Result<Arc<dyn ChatModel>, ApiError> {
        if let Some(llm) = &self.chat_model {
            return Ok(Arc::clone(llm));
        }
        let request = self.config.llm.to_request(provider, model);
        Ok(Arc::new(get_llm(&request)?))
    }

    fn default_intent<'a>(&'a self, explicit: Option<&'a str>) -> Option<&'a str> {
        explicit.or(self.config.llm.default_intent.as_deref())
    }

    fn handle_ask(
        &self,
        intent: &str,
        question: &str,
        default_intent: Option<&str>,
        provider: Option<&str>,
        model: Option<&str>,
    ) -> Result<String, ApiError> {
        let runtime = build_runtime()?;
        let llm = self.chat_model(provider, model)?;
        let chain = self
            .registry
            .write()
            .route(intent, llm, self.default_intent(default_intent))?;
        info!(
            intent,
            routed = chain.intent(),
            version = chain.version(),
            "Routing question"
        );

        let response = runtime.block_on(chain.invoke(&PromptInput::question(question)))?;
        Ok(format!("{}\n", response.content))
    }

    /// Read questions line by line until EOF, an empty line, or `exit`.
    pub fn run_chat<R: BufRead, W: Write>(
        &self,
        intent: &str,
        session: &str,
        provider: Option<&str>,
        model: Option<&str>,
        input: R,
        mut output: W,
    ) -> Result<String, ApiError> {
        let runtime = build_runtime()?;
        let llm = self.chat_model(provider, model)?;
        let chain = self
            .registry
            .write()
            .route(intent, llm, self.default_intent(None))?;

        writeln!(
            output,
            "Chatting with '{}' (version {}, model {}). Empty line or 'exit' to quit.",
            chain.intent(),
            chain.version(),
            chain.model_name()
        )?;
        let mut turns = 0usize;
        for line in input.lines() {
            let line = line?;
            let question = line.trim();
            if question.is_empty() || question == "exit" || question == "quit" {
                break;
            }
            let response = runtime.block_on(chain.invoke_with_history(
                &self.sessions,
                session,
                question,
            ))?;
            writeln!(output, "{}\n", response.content)?;
            output.flush()?;
            turns += 1;
        }
        Ok(format!("Session '{}' ended after {} turn(s)\n", session, turns))
    }

    fn embedding_model(
        &self,
        provider: Option<&str>,
        model: Option<&str>,
    ) -> Result<Arc<dyn EmbeddingModel>, ApiError> {
        if let Some(embedder) = &self.embedding_model {
            return Ok(Arc::clone(embedder));
        }
        let request = self.config.embedding.to_request(provider, model);
        Ok(Arc::new(get_embeddings(&request)?))
    }

    fn handle_embed(
        &self,
        texts: &[String],
        provider: Option<&str>,
        model: Option<&str>,
        format: OutputFormat,
    ) -> Result<String, ApiError> {
        let runtime = build_runtime()?;
        let embedder = self.embedding_model(provider, model)?;
        let vectors = runtime.block_on(embedder.embed_documents(texts))?;
        let dimensions = vectors.first().map(Vec::len).unwrap_or(0);
        info!(
            model = embedder.model_name(),
            inputs = texts.len(),
            dimensions,
            "Embedded texts"
        );

        match format {
            OutputFormat::Text => Ok(format_embeddings_text(
                embedder.model_name(),
                texts,
                &vectors,
            )),
            OutputFormat::Json => to_pretty(&json!({
                "model": embedder.model_name(),
                "dimensions": dimensions,
                "embeddings": vectors,
            })),
        }
    }

    fn handle_providers(&self, embeddings: bool) -> Result<String, ApiError> {
        let mut out = ProviderDiagnosticsService::list_providers_text(embeddings);
        if !embeddings {
            let provider = configured_chat_provider(self.config.llm.provider.as_deref());
            let check = ProviderDiagnosticsService::validate_chat_provider(&provider)?;
            out.push_str(&format_provider_check_text(&check));
        }
        Ok(out)
    }
}

/// Current-thread runtime for blocking on provider calls.
///
/// Refuses to nest inside a running runtime, where `block_on` would panic.
fn build_runtime() -> Result<tokio::runtime::Runtime, ApiError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(ApiError::ProviderError(
            "Cannot call a provider from inside an async runtime; use PromptChain::invoke instead"
                .to_string(),
        ));
    }
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ApiError::Io)
}

fn to_pretty<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// `key=value` pairs; the value is parsed as JSON when it is valid JSON.
fn parse_metadata(entries: &[String]) -> Result<Map<String, Value>, ApiError> {
    let mut map = Map::new();
    for entry in entries {
        let (key, raw) = entry.split_once('=').ok_or_else(|| {
            ApiError::ValidationFailed(format!("Metadata must be key=value, got '{}'", entry))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ApiError::ValidationFailed(format!(
                "Metadata key is empty in '{}'",
                entry
            )));
        }
        let value =
            serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        map.insert(key.to_string(), value);
    }
    Ok(map)
}
