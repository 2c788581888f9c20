//! Structured output expected from the analysis model

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::{AnalysisError, Relevance};

/// Raw structured answer of the model
#[derive(Debug, Clone, Deserialize)]
pub struct LlmAnalysisOutput {
    pub summary: String,
    pub logs: Vec<LlmLogAssessment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmLogAssessment {
    pub log_id: i64,
    pub relevance_score: f64,
    pub relevance_reason: String,
}

/// JSON schema sent with the request so the model answers in the shape above
pub fn analysis_response_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "summary": {
                "type": "string",
                "description": "Incident summary: what happened, likely root cause and recommended actions"
            },
            "logs": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "log_id": {"type": "integer"},
                        "relevance_score": {"type": "number"},
                        "relevance_reason": {"type": "string"}
                    },
                    "required": ["log_id", "relevance_score", "relevance_reason"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["summary", "logs"],
        "additionalProperties": false
    })
}

/// Extract the outermost JSON object from text (handles prose and markdown fences)
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Parse the model answer for `expected` logs numbered `1..=expected`.
///
/// Returns the summary and one relevance per log, ordered by log id.
pub fn parse_analysis_output(
    content: &str,
    expected: usize,
) -> Result<(String, Vec<Relevance>), AnalysisError> {
    let json_str = extract_json(content)
        .ok_or_else(|| AnalysisError::llm_response_parse("Response contains no JSON object"))?;

    let output: LlmAnalysisOutput = serde_json::from_str(json_str).map_err(|e| {
        warn!(error = %e, "Failed to parse LLM analysis response");
        AnalysisError::llm_response_parse(format!("Invalid analysis response format: {}", e))
    })?;

    if output.logs.len() != expected {
        return Err(AnalysisError::llm_response_parse(format!(
            "Expected assessments for {} logs, received {}",
            expected,
            output.logs.len()
        )));
    }

    let mut seen = HashSet::with_capacity(expected);
    let mut slots: Vec<Option<Relevance>> = vec![None; expected];

    for assessment in output.logs {
        let log_id = assessment.log_id;
        if log_id < 1 || log_id as usize > expected {
            return Err(AnalysisError::llm_response_parse(format!(
                "Unknown log_id {} (expected 1..={})",
                log_id, expected
            )));
        }
        if !seen.insert(log_id) {
            return Err(AnalysisError::llm_response_parse(format!(
                "Duplicate log_id {}",
                log_id
            )));
        }

        let score = if assessment.relevance_score.is_finite() {
            assessment.relevance_score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        slots[(log_id - 1) as usize] = Some(Relevance {
            score,
            reason: assessment.relevance_reason,
        });
    }

    Ok((output.summary, slots.into_iter().flatten().collect()))
}
