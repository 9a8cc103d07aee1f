//! JSON snapshot persistence for the prompt registry.
//!
//! The file is a JSON object keyed by intent; each value is the ordered list
//! of config records. Intent order is preserved in both directions.

use crate::error::ApiError;
use crate::prompt::config::PromptConfig;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// Ordered intent -> configs snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrySnapshot {
    pub intents: Vec<(String, Vec<PromptConfig>)>,
}

impl Serialize for RegistrySnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.intents.len()))?;
        for (intent, configs) in &self.intents {
            map.serialize_entry(intent, configs)?;
        }
        map.end()
    }
}

struct SnapshotVisitor;

impl<'de> Visitor<'de> for SnapshotVisitor {
    type Value = RegistrySnapshot;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object mapping intent names to lists of prompt configs")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut intents = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((intent, configs)) = access.next_entry::<String, Vec<PromptConfig>>()? {
            intents.push((intent, configs));
        }
        Ok(RegistrySnapshot { intents })
    }
}

impl<'de> Deserialize<'de> for RegistrySnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SnapshotVisitor)
    }
}

/// Read a snapshot. Malformed JSON is returned as `ApiError::Deserialization`.
pub fn read_snapshot(path: &Path) -> Result<RegistrySnapshot, ApiError> {
    let content = std::fs::read_to_string(path)?;
    let snapshot: RegistrySnapshot = serde_json::from_str(&content)?;
    Ok(snapshot)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write a snapshot, replacing `path` via a sibling temp file and rename.
///
/// Single-writer: concurrent saves race and the last rename wins.
pub fn write_snapshot(path: &Path, snapshot: &RegistrySnapshot) -> Result<(), ApiError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ApiError::ConfigError(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let content = serde_json::to_string_pretty(snapshot)?;
    let tmp = temp_path_for(path);
    std::fs::write(&tmp, content.as_bytes()).map_err(|e| {
        ApiError::ConfigError(format!("Failed to write {}: {}", tmp.display(), e))
    })?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        ApiError::ConfigError(format!("Failed to replace {}: {}", path.display(), e))
    })?;
    Ok(())
}
