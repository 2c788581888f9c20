//! Log record types

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// A single log record exactly as it appeared in the input, key order preserved
pub type RawLogRecord = serde_json::Map<String, serde_json::Value>;

/// Declared layout of an uploaded log file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Detect from content: JSON document when it starts with `[`, JSONL otherwise
    #[default]
    Auto,
    /// A JSON array of objects, or a single object
    Json,
    /// One JSON object per line
    Jsonl,
}

impl InputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Json => "json",
            Self::Jsonl => "jsonl",
        }
    }
}

impl FromStr for InputFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "json" => Ok(Self::Json),
            "jsonl" | "ndjson" => Ok(Self::Jsonl),
            other => Err(DomainError::validation(format!(
                "Unsupported log format '{}', expected one of: auto, json, jsonl",
                other
            ))),
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed log record together with the flat text used for embedding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedLogEntry {
    index: usize,
    record: RawLogRecord,
    text: String,
}

impl NormalizedLogEntry {
    pub fn new(index: usize, record: RawLogRecord, text: impl Into<String>) -> Self {
        Self {
            index,
            record,
            text: text.into(),
        }
    }

    /// Zero-based position among the valid records of the input
    pub fn index(&self) -> usize {
        self.index
    }

    /// The original record
    pub fn record(&self) -> &RawLogRecord {
        &self.record
    }

    /// Flattened scalar values, space separated
    pub fn text(&self) -> &str {
        &self.text
    }

    /// First non-empty value among the given top-level fields
    pub fn field_as_string(&self, candidates: &[&str]) -> Option<String> {
        candidates.iter().find_map(|field| match self.record.get(*field) {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(serde_json::Value::Null) | Some(serde_json::Value::String(_)) | None => None,
            Some(other) => Some(other.to_string()),
        })
    }
}
