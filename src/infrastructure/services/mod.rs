//! Infrastructure services

mod embedding_service;
mod log_analysis_service;
mod pipeline_service;

pub use embedding_service::EmbeddingService;
pub use log_analysis_service::{
    LlmAnalysis, LogAnalysisService, LogAnalysisSettings, NO_RELEVANT_LOGS_SUMMARY,
};
pub use pipeline_service::{AnalysisLimits, IncidentAnalysisService, DEGRADED_SUMMARY_PREFIX};
