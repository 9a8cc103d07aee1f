//! Chat templates: ordered role-tagged entries with `{variable}` slots.
//!
//! Literal braces are written `{{` and `}}`. A placeholder entry expands to a
//! caller-supplied message list (conversation history).

use crate::error::ApiError;
use crate::provider::{ChatMessage, MessageRole};
use std::collections::HashMap;

/// Name of the history slot reserved by configs with `include_history`.
pub const HISTORY_VARIABLE: &str = "history";

/// Name of the variable the human entry is templated on.
pub const QUESTION_VARIABLE: &str = "question";

/// One entry of a [`ChatTemplate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateEntry {
    Message { role: MessageRole, template: String },
    /// A variable-length run of messages. Optional placeholders render empty
    /// when the input does not provide them.
    Placeholder { variable: String, optional: bool },
}

/// Ordered template description, not yet bound to input values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatTemplate {
    entries: Vec<TemplateEntry>,
}

/// Values a template is rendered with.
#[derive(Debug, Clone, Default)]
pub struct PromptInput {
    variables: HashMap<String, String>,
    messages: HashMap<String, Vec<ChatMessage>>,
}

impl PromptInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input holding only `{question}`.
    pub fn question(question: impl Into<String>) -> Self {
        Self::new().with_variable(QUESTION_VARIABLE, question)
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_messages(mut self, name: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        self.messages.insert(name.into(), messages);
        self
    }

    pub fn with_history(self, history: Vec<ChatMessage>) -> Self {
        self.with_messages(HISTORY_VARIABLE, history)
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }
}

impl ChatTemplate {
    pub fn from_entries(entries: Vec<TemplateEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_placeholder(&self, variable: &str) -> bool {
        self.entries.iter().any(|entry| {
            matches!(entry, TemplateEntry::Placeholder { variable: v, .. } if v == variable)
        })
    }

    /// Distinct variable names in entry order, placeholders included.
    pub fn input_variables(&self) -> Result<Vec<String>, ApiError> {
        let mut names: Vec<String> = Vec::new();
        for entry in &self.entries {
            let found = match entry {
                TemplateEntry::Message { template, .. } => template_variables(template)?,
                TemplateEntry::Placeholder { variable, .. } => vec![variable.clone()],
            };
            for name in found {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }

    /// Bind `input` into concrete messages.
    pub fn render(&self, input: &PromptInput) -> Result<Vec<ChatMessage>, ApiError> {
        let mut out = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            match entry {
                TemplateEntry::Message { role, template } => {
                    out.push(ChatMessage::new(
                        *role,
                        format_template(template, &input.variables)?,
                    ));
                }
                TemplateEntry::Placeholder { variable, optional } => {
                    match input.messages.get(variable) {
                        Some(messages) => out.extend(messages.iter().cloned()),
                        None if *optional => {}
                        None => {
                            return Err(ApiError::TemplateError(format!(
                                "Missing message list for placeholder '{}'",
                                variable
                            )))
                        }
                    }
                }
            }
        }
        Ok(out)
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Brace(char),
    Variable(&'a str),
}

fn parse_segments(template: &str) -> Result<Vec<Segment<'_>>, ApiError> {
    let mut segments = Vec::new();
    let bytes = template.as_bytes();
    let mut literal_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                segments.push(Segment::Literal(&template[literal_start..i]));
                segments.push(Segment::Brace('{'));
                i += 2;
                literal_start = i;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                segments.push(Segment::Literal(&template[literal_start..i]));
                segments.push(Segment::Brace('}'));
                i += 2;
                literal_start = i;
            }
            b'{' => {
                let close = template[i + 1..]
                    .find(&['}', '{'][..])
                    .map(|p| p + i + 1);
                let Some(close) = close.filter(|&c| bytes[c] == b'}') else {
                    return Err(ApiError::TemplateError(format!(
                        "Unclosed '{{' at byte {}",
                        i
                    )));
                };
                let name = template[i + 1..close].trim();
                if name.is_empty() {
                    return Err(ApiError::TemplateError(format!(
                        "Empty variable name at byte {}",
                        i
                    )));
                }
                segments.push(Segment::Literal(&template[literal_start..i]));
                segments.push(Segment::Variable(name));
                i = close + 1;
                literal_start = i;
            }
            b'}' => {
                return Err(ApiError::TemplateError(format!(
                    "Unmatched '}}' at byte {}",
                    i
                )));
            }
            _ => i += 1,
        }
    }
    segments.push(Segment::Literal(&template[literal_start..]));
    Ok(segments)
}

/// Variable names referenced by `template`, in first-seen order.
pub fn template_variables(template: &str) -> Result<Vec<String>, ApiError> {
    let mut names: Vec<String> = Vec::new();
    for segment in parse_segments(template)? {
        if let Segment::Variable(name) = segment {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Substitute `{name}` slots from `variables`.
pub fn format_template(
    template: &str,
    variables: &HashMap<String, String>,
) -> Result<String, ApiError> {
    let mut out = String::with_capacity(template.len());
    for segment in parse_segments(template)? {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Brace(c) => out.push(c),
            Segment::Variable(name) => {
                let value = variables.get(name).ok_or_else(|| {
                    ApiError::TemplateError(format!("Missing variable '{}'", name))
                })?;
                out.push_str(value);
            }
        }
    }
    Ok(out)
}
