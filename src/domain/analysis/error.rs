//! Analysis pipeline errors

use thiserror::Error;

use crate::domain::DomainError;

/// Failure categories of an analysis run
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The upload contained no usable JSON object records
    #[error("No valid log entries found: {reason}")]
    EmptyOrInvalidLogFile { reason: String },

    /// An embedding batch failed; fatal for the run
    #[error("Embedding service error on batch {batch_index}: {cause}")]
    EmbeddingService {
        batch_index: usize,
        #[source]
        cause: DomainError,
    },

    /// The LLM answered but not in the requested structure
    #[error("Failed to parse LLM analysis response: {0}")]
    LlmResponseParse(String),

    /// The LLM call itself failed
    #[error("LLM analysis request failed: {0}")]
    LlmService(String),

    /// A model has no entry in the pricing table
    #[error("No pricing configured for model '{0}'")]
    UnknownPricingModel(String),

    #[error("Internal pipeline error: {0}")]
    Internal(String),
}

impl AnalysisError {
    pub fn empty_or_invalid(reason: impl Into<String>) -> Self {
        Self::EmptyOrInvalidLogFile {
            reason: reason.into(),
        }
    }

    pub fn embedding_service(batch_index: usize, cause: DomainError) -> Self {
        Self::EmbeddingService { batch_index, cause }
    }

    pub fn llm_response_parse(message: impl Into<String>) -> Self {
        Self::LlmResponseParse(message.into())
    }

    pub fn llm_service(message: impl Into<String>) -> Self {
        Self::LlmService(message.into())
    }

    pub fn unknown_pricing_model(model: impl Into<String>) -> Self {
        Self::UnknownPricingModel(model.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable machine-readable code for API responses and metrics
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyOrInvalidLogFile { .. } => "empty_or_invalid_log_file",
            Self::EmbeddingService { .. } => "embedding_service_error",
            Self::LlmResponseParse(_) => "llm_response_parse_error",
            Self::LlmService(_) => "llm_service_error",
            Self::UnknownPricingModel(_) => "unknown_pricing_model",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Whether the run can still complete with a degraded analysis
    pub fn is_degradable(&self) -> bool {
        matches!(self, Self::LlmResponseParse(_) | Self::LlmService(_))
    }
}
