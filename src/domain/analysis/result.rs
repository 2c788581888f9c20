//! Result of an analysis run

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::ranking::ScoredLogEntry;
use crate::domain::usage::CostRecord;

/// LLM judgement of one log entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relevance {
    /// In [0, 1]
    pub score: f64,
    pub reason: String,
}

/// A ranked entry that was sent to the LLM, with its judgement
#[derive(Debug, Clone)]
pub struct AnalyzedLogEntry {
    pub entry: ScoredLogEntry,
    pub relevance: Relevance,
}

/// A ranked entry returned to the caller, annotated when the LLM saw it
#[derive(Debug, Clone)]
pub struct FilteredLog {
    pub entry: ScoredLogEntry,
    pub relevance: Option<Relevance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Completed,
    /// Ranking succeeded but the LLM stage did not produce a usable analysis
    Degraded,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Degraded => "degraded",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StageTimings {
    pub embedding_filter_ms: u64,
    pub llm_analysis_ms: u64,
    pub total_ms: u64,
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub analysis_id: Uuid,
    pub prompt: String,
    pub total_logs_processed: usize,
    pub skipped_records: usize,
    pub filtered_logs: Vec<FilteredLog>,
    pub highlighted_logs: Vec<AnalyzedLogEntry>,
    pub cost: CostRecord,
    pub analysis_summary: String,
    pub status: AnalysisStatus,
    pub timings: StageTimings,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn is_degraded(&self) -> bool {
        self.status == AnalysisStatus::Degraded
    }
}
