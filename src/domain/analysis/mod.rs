//! Analysis results, errors and the structured LLM output contract

mod error;
mod output;
mod result;

pub use error::AnalysisError;
pub use output::{analysis_response_schema, extract_json, parse_analysis_output, LlmAnalysisOutput};
pub use result::{
    AnalysisResult, AnalysisStatus, AnalyzedLogEntry, FilteredLog, Relevance, StageTimings,
};
