//! JSON / JSONL parsing and text synthesis for log records

use std::borrow::Cow;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::{InputFormat, NormalizedLogEntry, RawLogRecord};
use crate::domain::analysis::AnalysisError;

/// Output of normalization: surviving records in file order plus the skip count
#[derive(Debug, Clone)]
pub struct NormalizedLogs {
    pub entries: Vec<Arc<NormalizedLogEntry>>,
    pub skipped: usize,
}

impl NormalizedLogs {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.text())
    }
}

#[derive(Debug, Default)]
struct ParsedRecords {
    records: Vec<RawLogRecord>,
    skipped: usize,
}

/// Parse raw file content into normalized log entries.
///
/// Malformed lines and non-object values are skipped and counted. Fails with
/// `EmptyOrInvalidLogFile` when the content is not UTF-8 or yields no object.
pub fn normalize(content: &[u8], format: InputFormat) -> Result<NormalizedLogs, AnalysisError> {
    let text = std::str::from_utf8(content).map_err(|e| {
        AnalysisError::empty_or_invalid(format!(
            "File encoding not supported, expected UTF-8: {}",
            e
        ))
    })?;
    let text = text.trim_start_matches('\u{feff}');

    let parsed = match format {
        InputFormat::Jsonl => parse_jsonl(text),
        InputFormat::Json => parse_document(text).unwrap_or_default(),
        InputFormat::Auto => parse_auto(text),
    };

    if parsed.records.is_empty() {
        return Err(AnalysisError::empty_or_invalid(format!(
            "No valid JSON object records found ({} entries skipped)",
            parsed.skipped
        )));
    }

    let entries = parsed
        .records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let text = flatten_record(&record);
            Arc::new(NormalizedLogEntry::new(index, record, text))
        })
        .collect();

    Ok(NormalizedLogs {
        entries,
        skipped: parsed.skipped,
    })
}

fn parse_auto(text: &str) -> ParsedRecords {
    if text.trim_start().starts_with('[') {
        if let Some(parsed) = parse_document(text) {
            return parsed;
        }
    }

    let parsed = parse_jsonl(text);

    // A single pretty-printed object spans several lines and fails line by line
    if parsed.records.is_empty() {
        if let Some(document) = parse_document(text) {
            if !document.records.is_empty() {
                return document;
            }
        }
    }

    parsed
}

fn parse_jsonl(text: &str) -> ParsedRecords {
    let mut parsed = ParsedRecords::default();

    for (line_num, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(record)) => parsed.records.push(record),
            Ok(other) => {
                debug!(line = line_num + 1, kind = value_kind(&other), "Skipping non-object log line");
                parsed.skipped += 1;
            }
            Err(e) => {
                debug!(line = line_num + 1, error = %e, "Skipping malformed log line");
                parsed.skipped += 1;
            }
        }
    }

    parsed
}

/// Parse the whole content as one JSON document. `None` when it is not valid JSON.
fn parse_document(text: &str) -> Option<ParsedRecords> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    let mut parsed = ParsedRecords::default();

    match value {
        Value::Array(items) => {
            for (position, item) in items.into_iter().enumerate() {
                match item {
                    Value::Object(record) => parsed.records.push(record),
                    other => {
                        debug!(position, kind = value_kind(&other), "Skipping non-object array element");
                        parsed.skipped += 1;
                    }
                }
            }
        }
        Value::Object(record) => parsed.records.push(record),
        _ => parsed.skipped += 1,
    }

    Some(parsed)
}

/// Join every scalar leaf of a record with single spaces.
///
/// Walks values depth-first in key insertion order; arrays (including arrays
/// of objects) are walked in element order. Nulls and blank strings are
/// dropped. A record with no remaining scalar falls back to its compact JSON,
/// so the text is never empty.
pub fn flatten_record(record: &RawLogRecord) -> String {
    let mut parts: Vec<Cow<'_, str>> = Vec::new();

    for value in record.values() {
        collect_scalars(value, &mut parts);
    }

    if parts.is_empty() {
        return Value::Object(record.clone()).to_string();
    }

    parts.join(" ")
}

fn collect_scalars<'a>(value: &'a Value, out: &mut Vec<Cow<'a, str>>) {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                out.push(Cow::Borrowed(trimmed));
            }
        }
        Value::Number(n) => out.push(Cow::Owned(n.to_string())),
        Value::Bool(b) => out.push(Cow::Owned(b.to_string())),
        Value::Array(items) => items.iter().for_each(|item| collect_scalars(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_scalars(item, out)),
        Value::Null => {}
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
