//! Analyze-logs response body

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::analysis::{AnalysisResult, AnalysisStatus, FilteredLog, StageTimings};
use crate::domain::log::RawLogRecord;
use crate::domain::usage::CostRecord;

/// One ranked log as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct FilteredLogResponse {
    pub record: RawLogRecord,
    pub similarity_score: f32,
    pub rank: usize,
    pub relevance_score: Option<f64>,
    pub relevance_reason: Option<String>,
}

impl From<FilteredLog> for FilteredLogResponse {
    fn from(log: FilteredLog) -> Self {
        let (relevance_score, relevance_reason) = match log.relevance {
            Some(relevance) => (Some(relevance.score), Some(relevance.reason)),
            None => (None, None),
        };

        Self {
            record: log.entry.entry().record().clone(),
            similarity_score: log.entry.similarity(),
            rank: log.entry.rank(),
            relevance_score,
            relevance_reason,
        }
    }
}

/// Report shared by the HTTP endpoint and the `analyze` command
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeLogsResponse {
    pub success: bool,
    pub analysis_id: Uuid,
    pub prompt: String,
    pub total_logs_processed: usize,
    pub skipped_records: usize,
    pub filtered_logs_count: usize,
    pub highlighted_logs_count: usize,
    pub filtered_logs: Vec<FilteredLogResponse>,
    pub analysis_summary: String,
    pub analysis_status: AnalysisStatus,
    pub embedding_cost: f64,
    pub llm_cost: f64,
    pub total_cost: f64,
    pub cost_breakdown: CostRecord,
    pub timing: StageTimings,
    pub analyzed_at: DateTime<Utc>,
}

impl From<AnalysisResult> for AnalyzeLogsResponse {
    fn from(result: AnalysisResult) -> Self {
        let filtered_logs: Vec<FilteredLogResponse> = result
            .filtered_logs
            .into_iter()
            .map(FilteredLogResponse::from)
            .collect();

        Self {
            success: true,
            analysis_id: result.analysis_id,
            prompt: result.prompt,
            total_logs_processed: result.total_logs_processed,
            skipped_records: result.skipped_records,
            filtered_logs_count: filtered_logs.len(),
            highlighted_logs_count: result.highlighted_logs.len(),
            filtered_logs,
            analysis_summary: result.analysis_summary,
            analysis_status: result.status,
            embedding_cost: result.cost.embedding_cost,
            llm_cost: result.cost.llm_cost,
            total_cost: result.cost.total_cost,
            cost_breakdown: result.cost,
            timing: result.timings,
            analyzed_at: result.analyzed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{AnalyzedLogEntry, Relevance};
    use crate::domain::log::NormalizedLogEntry;
    use crate::domain::ranking::ScoredLogEntry;
    use serde_json::json;
    use std::sync::Arc;

    fn scored(index: usize, message: &str, similarity: f32, rank: usize) -> ScoredLogEntry {
        let record = json!({"message": message}).as_object().cloned().unwrap();
        ScoredLogEntry::new(
            Arc::new(NormalizedLogEntry::new(index, record, message)),
            similarity,
            rank,
        )
    }

    fn result() -> AnalysisResult {
        let relevance = Relevance {
            score: 0.9,
            reason: "cart crash".to_string(),
        };
        let top = scored(3, "cart crashed", 0.92, 1);

        AnalysisResult {
            analysis_id: Uuid::nil(),
            prompt: "cart".to_string(),
            total_logs_processed: 5,
            skipped_records: 1,
            filtered_logs: vec![
                FilteredLog {
                    entry: top.clone(),
                    relevance: Some(relevance.clone()),
                },
                FilteredLog {
                    entry: scored(0, "login ok", 0.3, 2),
                    relevance: None,
                },
            ],
            highlighted_logs: vec![AnalyzedLogEntry {
                entry: top,
                relevance,
            }],
            cost: CostRecord {
                embedding_tokens: 60,
                embedding_cost: 0.0000012,
                llm_input_tokens: 1000,
                llm_output_tokens: 100,
                llm_cost: 0.00021,
                total_cost: 0.0002112,
            },
            analysis_summary: "Cart service is down".to_string(),
            status: AnalysisStatus::Completed,
            timings: StageTimings::default(),
            analyzed_at: Utc::now(),
        }
    }

    #[test]
    fn test_response_shape() {
        let json = serde_json::to_value(AnalyzeLogsResponse::from(result())).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["total_logs_processed"], 5);
        assert_eq!(json["skipped_records"], 1);
        assert_eq!(json["filtered_logs_count"], 2);
        assert_eq!(json["highlighted_logs_count"], 1);
        assert_eq!(json["analysis_status"], "completed");
        assert_eq!(json["cost_breakdown"]["embedding_tokens"], 60);
        assert_eq!(json["llm_cost"], 0.00021);
        assert!(json["timing"].get("total_ms").is_some());
        assert_eq!(json["analysis_id"], Uuid::nil().to_string());
        assert!(json["analyzed_at"].is_string());
    }

    #[test]
    fn test_filtered_log_fields() {
        let json = serde_json::to_value(AnalyzeLogsResponse::from(result())).unwrap();
        let logs = json["filtered_logs"].as_array().unwrap();

        assert_eq!(logs[0]["record"]["message"], "cart crashed");
        assert_eq!(logs[0]["rank"], 1);
        assert_eq!(logs[0]["relevance_score"], 0.9);
        assert_eq!(logs[0]["relevance_reason"], "cart crash");
        assert!(logs[1]["relevance_score"].is_null());
        assert!(logs[1]["relevance_reason"].is_null());
    }
}
