//! LLM incident analysis of the top-ranked log entries
//!
//! Builds a numbered log context, asks the model for a structured answer and
//! maps the per-log judgements back onto the ranked entries.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::analysis::{
    analysis_response_schema, parse_analysis_output, AnalysisError, AnalyzedLogEntry,
};
use crate::domain::llm::{LlmProvider, LlmRequest, LlmResponseFormat};
use crate::domain::log::NormalizedLogEntry;
use crate::domain::ranking::ScoredLogEntry;
use crate::domain::usage::{estimate_tokens, CostAccountant};
use crate::infrastructure::observability::{
    record_provider_request, record_provider_tokens, ProviderKind,
};

const TIMESTAMP_FIELDS: &[&str] = &["timestamp", "time", "@timestamp", "date", "datetime", "created_at"];
const MESSAGE_FIELDS: &[&str] = &["message", "msg", "log", "content", "description"];
const MAX_FALLBACK_CONTENT_CHARS: usize = 500;

pub const NO_RELEVANT_LOGS_SUMMARY: &str = "No relevant logs found for the given prompt";

const SYSTEM_PROMPT: &str = "You are an expert log analyzer helping with incident investigation. \
Provide concise, actionable insights. Answer only with JSON matching the requested schema.";

/// Model parameters for the analysis call
#[derive(Debug, Clone)]
pub struct LogAnalysisSettings {
    pub model: String,
    pub max_logs_for_analysis: usize,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Summary and per-log judgements returned by the model
#[derive(Debug, Clone)]
pub struct LlmAnalysis {
    pub summary: String,
    pub analyzed: Vec<AnalyzedLogEntry>,
}

/// Sends a capped subset of ranked logs to the LLM
#[derive(Debug)]
pub struct LogAnalysisService {
    provider: Arc<dyn LlmProvider>,
    settings: LogAnalysisSettings,
}

impl LogAnalysisService {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: LogAnalysisSettings) -> Self {
        Self { provider, settings }
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Analyze the highest-ranked entries, at most `max_logs_for_analysis` of them.
    ///
    /// Token usage is recorded before the answer is parsed, so a contract
    /// violation still reports what the call cost.
    pub async fn analyze(
        &self,
        prompt: &str,
        ranked: &[ScoredLogEntry],
        costs: &mut CostAccountant,
    ) -> Result<LlmAnalysis, AnalysisError> {
        let subset = &ranked[..ranked.len().min(self.settings.max_logs_for_analysis)];

        if subset.is_empty() {
            debug!("No ranked logs to analyze, skipping LLM call");
            return Ok(LlmAnalysis {
                summary: NO_RELEVANT_LOGS_SUMMARY.to_string(),
                analyzed: Vec::new(),
            });
        }

        let request = self.build_request(prompt, subset);
        let prompt_text = request.prompt_text();

        debug!(
            model = %self.settings.model,
            logs = subset.len(),
            dropped = ranked.len() - subset.len(),
            "Sending logs to LLM for analysis"
        );

        let response = match self.provider.chat(&self.settings.model, request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(model = %self.settings.model, error = %e, "LLM analysis request failed");
                record_provider_request(ProviderKind::Llm, &self.settings.model, false);
                return Err(AnalysisError::llm_service(e.to_string()));
            }
        };
        record_provider_request(ProviderKind::Llm, &self.settings.model, true);

        let content = response.content().unwrap_or_default();
        let (input_tokens, output_tokens) = match response.usage {
            Some(usage) => (usage.prompt_tokens, usage.completion_tokens),
            None => {
                debug!("Provider omitted usage, estimating tokens from text");
                (estimate_tokens(&prompt_text), estimate_tokens(content))
            }
        };

        record_provider_tokens(ProviderKind::Llm, &self.settings.model, "input", u64::from(input_tokens));
        record_provider_tokens(ProviderKind::Llm, &self.settings.model, "output", u64::from(output_tokens));
        costs.record_llm(&self.settings.model, input_tokens, output_tokens)?;

        if content.trim().is_empty() {
            return Err(AnalysisError::llm_response_parse("Empty response from LLM"));
        }

        let (summary, relevance) = parse_analysis_output(content, subset.len())?;

        let analyzed: Vec<AnalyzedLogEntry> = subset
            .iter()
            .cloned()
            .zip(relevance)
            .map(|(entry, relevance)| AnalyzedLogEntry { entry, relevance })
            .collect();

        info!(
            model = %self.settings.model,
            analyzed = analyzed.len(),
            input_tokens,
            output_tokens,
            "LLM analysis completed"
        );

        Ok(LlmAnalysis { summary, analyzed })
    }

    fn build_request(&self, prompt: &str, subset: &[ScoredLogEntry]) -> LlmRequest {
        LlmRequest::builder()
            .system(SYSTEM_PROMPT)
            .user(build_analysis_prompt(prompt, &build_log_context(subset), subset.len()))
            .temperature(self.settings.temperature)
            .max_tokens(self.settings.max_output_tokens)
            .response_format(LlmResponseFormat::strict_schema(
                "incident_analysis",
                analysis_response_schema(),
            ))
            .build()
    }
}

/// One line per entry: `Log <n> (similarity: 0.000): [timestamp] content`
fn build_log_context(entries: &[ScoredLogEntry]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, scored)| {
            let entry = scored.entry();
            let mut line = format!("Log {} (similarity: {:.3}):", i + 1, scored.similarity());
            if let Some(timestamp) = entry.field_as_string(TIMESTAMP_FIELDS) {
                line.push_str(&format!(" [{}]", timestamp));
            }
            line.push(' ');
            line.push_str(&main_content(entry));
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn main_content(entry: &NormalizedLogEntry) -> String {
    entry
        .field_as_string(MESSAGE_FIELDS)
        .unwrap_or_else(|| entry.text().chars().take(MAX_FALLBACK_CONTENT_CHARS).collect())
}

fn build_analysis_prompt(prompt: &str, log_context: &str, count: usize) -> String {
    format!(
        "Analyze the following logs for the incident: \"{prompt}\"\n\n\
Logs (ordered by semantic relevance to the incident):\n\
{log_context}\n\n\
Respond with:\n\
- summary: what is happening, the most likely root cause and the recommended actions.\n\
- logs: exactly one entry for each log_id from 1 to {count}, with a relevance_score between 0 and 1 \
and a short relevance_reason explaining how the log relates to the incident.\n\n\
Be concise and focus on actionable insights. The logs are already filtered for relevance."
    )
}
