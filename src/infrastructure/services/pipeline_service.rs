//! Incident analysis pipeline
//!
//! Normalize → embed → rank → LLM analysis → result, with one cost
//! accountant per run.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::embedding_service::EmbeddingService;
use super::log_analysis_service::{LlmAnalysis, LogAnalysisService};
use crate::domain::analysis::{
    AnalysisError, AnalysisResult, AnalysisStatus, FilteredLog, StageTimings,
};
use crate::domain::log::{normalize, InputFormat};
use crate::domain::pipeline::{PipelineStage, PipelineTracker};
use crate::domain::ranking::SimilarityRanker;
use crate::domain::usage::{CostAccountant, PricingTable};
use crate::infrastructure::observability::record_analysis_run;

pub const DEGRADED_SUMMARY_PREFIX: &str = "Analysis unavailable: ";

/// Result size limits of a run
#[derive(Debug, Clone, Copy)]
pub struct AnalysisLimits {
    pub top_n_similar_logs: usize,
    pub max_logs_for_analysis: usize,
    pub max_returned_logs: usize,
}

impl AnalysisLimits {
    /// Entries sent to the LLM never exceed the ranked set
    pub fn analysis_cap(&self) -> usize {
        self.max_logs_for_analysis.min(self.top_n_similar_logs)
    }
}

/// Runs the two-stage relevance pipeline for one upload
#[derive(Debug)]
pub struct IncidentAnalysisService {
    embeddings: EmbeddingService,
    analysis: LogAnalysisService,
    pricing: Arc<PricingTable>,
    ranker: SimilarityRanker,
    limits: AnalysisLimits,
}

impl IncidentAnalysisService {
    /// Fails when either model has no price, before any external call is made
    pub fn new(
        embeddings: EmbeddingService,
        analysis: LogAnalysisService,
        pricing: Arc<PricingTable>,
        limits: AnalysisLimits,
    ) -> Result<Self, AnalysisError> {
        pricing.ensure_priced([embeddings.model(), analysis.model()])?;

        Ok(Self {
            embeddings,
            analysis,
            pricing,
            ranker: SimilarityRanker::new(limits.top_n_similar_logs),
            limits,
        })
    }

    pub fn limits(&self) -> AnalysisLimits {
        self.limits
    }

    pub async fn analyze(
        &self,
        content: &[u8],
        prompt: &str,
        format: InputFormat,
    ) -> Result<AnalysisResult, AnalysisError> {
        let analysis_id = Uuid::new_v4();
        let mut tracker = PipelineTracker::new();

        let outcome = self
            .run(analysis_id, &mut tracker, content, prompt, format)
            .instrument(info_span!("incident_analysis", %analysis_id))
            .await;

        match outcome {
            Ok(result) => {
                record_analysis_run(
                    result.status.as_str(),
                    result.total_logs_processed,
                    result.cost.total_cost,
                );
                Ok(result)
            }
            Err(e) => {
                tracker.fail(&e);
                record_analysis_run("failed", 0, 0.0);
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        analysis_id: Uuid,
        tracker: &mut PipelineTracker,
        content: &[u8],
        prompt: &str,
        format: InputFormat,
    ) -> Result<AnalysisResult, AnalysisError> {
        let started = Instant::now();
        let mut costs = CostAccountant::new(Arc::clone(&self.pricing));

        let logs = normalize(content, format)?;
        tracker.advance(PipelineStage::Normalized)?;
        info!(
            records = logs.len(),
            skipped = logs.skipped,
            format = %format,
            "Log file normalized"
        );

        let texts: Vec<String> = std::iter::once(prompt.to_string())
            .chain(logs.texts().map(str::to_string))
            .collect();
        let mut vectors = self.embeddings.embed(texts, &mut costs).await?;
        if vectors.len() != logs.len() + 1 {
            return Err(AnalysisError::internal("Embedding count does not match input"));
        }
        let log_vectors = vectors.split_off(1);
        let prompt_vector = vectors.pop().unwrap_or_default();
        tracker.advance(PipelineStage::Embedded)?;

        let ranked = self.ranker.rank(&prompt_vector, &logs.entries, &log_vectors)?;
        tracker.advance(PipelineStage::Ranked)?;
        let embedding_filter_ms = started.elapsed().as_millis() as u64;

        let llm_started = Instant::now();
        let cap = ranked.len().min(self.limits.analysis_cap());
        let (status, LlmAnalysis { summary, analyzed }) =
            match self.analysis.analyze(prompt, &ranked[..cap], &mut costs).await {
                Ok(analysis) => (AnalysisStatus::Completed, analysis),
                Err(e) if e.is_degradable() => {
                    warn!(code = e.code(), error = %e, "LLM analysis degraded");
                    (
                        AnalysisStatus::Degraded,
                        LlmAnalysis {
                            summary: format!("{}{}", DEGRADED_SUMMARY_PREFIX, e),
                            analyzed: Vec::new(),
                        },
                    )
                }
                Err(e) => return Err(e),
            };
        let llm_analysis_ms = llm_started.elapsed().as_millis() as u64;
        tracker.advance(PipelineStage::Analyzed)?;

        // analyzed[i] was produced from ranked[i]
        let filtered_logs: Vec<FilteredLog> = ranked
            .into_iter()
            .take(self.limits.max_returned_logs)
            .enumerate()
            .map(|(position, entry)| FilteredLog {
                relevance: analyzed.get(position).map(|a| a.relevance.clone()),
                entry,
            })
            .collect();

        let result = AnalysisResult {
            analysis_id,
            prompt: prompt.to_string(),
            total_logs_processed: logs.len(),
            skipped_records: logs.skipped,
            filtered_logs,
            highlighted_logs: analyzed,
            cost: costs.total(),
            analysis_summary: summary,
            status,
            timings: StageTimings {
                embedding_filter_ms,
                llm_analysis_ms,
                total_ms: started.elapsed().as_millis() as u64,
            },
            analyzed_at: Utc::now(),
        };
        tracker.advance(PipelineStage::Completed)?;

        info!(
            processed = result.total_logs_processed,
            filtered = result.filtered_logs.len(),
            highlighted = result.highlighted_logs.len(),
            total_cost = result.cost.total_cost,
            status = status.as_str(),
            "Incident analysis completed"
        );

        Ok(result)
    }
}
