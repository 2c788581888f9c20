//! Incident Log Analyzer
//!
//! Narrows a JSON or JSONL log file down to the entries that explain an
//! incident:
//! - Embedding similarity ranking of every record against the prompt
//! - Structured LLM analysis of the top-ranked records
//! - Per-request token cost accounting

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use api::state::AppState;
use domain::{AnalysisError, DomainError, LlmProvider};
use domain::embedding::EmbeddingProvider;
use infrastructure::embedding::OpenAiEmbeddingProvider;
use infrastructure::llm::{HttpClient, OpenAiProvider};
use infrastructure::services::{
    AnalysisLimits, EmbeddingService, IncidentAnalysisService, LogAnalysisService,
    LogAnalysisSettings,
};

/// Wire the pipeline around the given providers.
///
/// Fails when either configured model is missing from the pricing table.
pub fn build_analysis_service(
    config: &AppConfig,
    embeddings: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
) -> Result<IncidentAnalysisService, AnalysisError> {
    let analysis = &config.analysis;

    IncidentAnalysisService::new(
        EmbeddingService::new(
            embeddings,
            analysis.embedding_model.clone(),
            analysis.embedding_batch_size,
        ),
        LogAnalysisService::new(
            llm,
            LogAnalysisSettings {
                model: analysis.analysis_model.clone(),
                max_logs_for_analysis: analysis.effective_analysis_cap(),
                temperature: analysis.temperature,
                max_output_tokens: analysis.max_output_tokens,
            },
        ),
        Arc::new(config.pricing_table()),
        AnalysisLimits {
            top_n_similar_logs: analysis.top_n_similar_logs,
            max_logs_for_analysis: analysis.max_logs_for_analysis,
            max_returned_logs: analysis.max_returned_logs,
        },
    )
}

/// Pipeline backed by the OpenAI embedding and chat completion APIs
pub fn create_analysis_service(config: &AppConfig) -> anyhow::Result<IncidentAnalysisService> {
    config.validate().context("Invalid configuration")?;

    let api_key = config.resolved_api_key().ok_or_else(|| {
        DomainError::configuration("OpenAI API key missing: set openai.api_key or OPENAI_API_KEY")
    })?;
    let client = HttpClient::with_timeout(Duration::from_secs(config.openai.timeout_secs))?;

    let embeddings = OpenAiEmbeddingProvider::with_base_url(
        client.clone(),
        api_key.clone(),
        config.openai.base_url.clone(),
    );
    let llm = OpenAiProvider::with_base_url(client, api_key, config.openai.base_url.clone());

    let service = build_analysis_service(config, Arc::new(embeddings), Arc::new(llm))?;

    info!(
        embedding_model = %config.analysis.embedding_model,
        analysis_model = %config.analysis.analysis_model,
        top_n = config.analysis.top_n_similar_logs,
        analysis_cap = config.analysis.effective_analysis_cap(),
        "Analysis service initialized"
    );

    Ok(service)
}

/// Application state for the HTTP server
pub fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let service = create_analysis_service(config)?;
    Ok(AppState::new(service, config.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PricingOverride;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::llm::MockLlmProvider;

    fn mocks() -> (Arc<MockEmbeddingProvider>, Arc<MockLlmProvider>) {
        (
            Arc::new(MockEmbeddingProvider::new(4)),
            Arc::new(MockLlmProvider::new("mock")),
        )
    }

    #[test]
    fn test_build_with_defaults() {
        let (embeddings, llm) = mocks();

        let service = build_analysis_service(&AppConfig::default(), embeddings, llm).unwrap();

        assert_eq!(service.limits().top_n_similar_logs, 100);
        assert_eq!(service.limits().analysis_cap(), 50);
    }

    #[test]
    fn test_unpriced_model_rejected() {
        let mut config = AppConfig::default();
        config.analysis.analysis_model = "in-house-llm".to_string();
        let (embeddings, llm) = mocks();

        let err = build_analysis_service(&config, embeddings, llm).unwrap_err();

        assert!(matches!(err, AnalysisError::UnknownPricingModel(model) if model == "in-house-llm"));
    }

    #[test]
    fn test_pricing_override_enables_model() {
        let mut config = AppConfig::default();
        config.analysis.analysis_model = "in-house-llm".to_string();
        config.pricing.insert(
            "in-house-llm".to_string(),
            PricingOverride {
                input_per_1k: 0.001,
                output_per_1k: 0.002,
            },
        );
        let (embeddings, llm) = mocks();

        assert!(build_analysis_service(&config, embeddings, llm).is_ok());
    }

    #[test]
    fn test_app_state_with_configured_key() {
        let mut config = AppConfig::default();
        config.openai.api_key = Some("sk-test".to_string());

        let state = create_app_state_with_config(&config).unwrap();

        assert_eq!(state.config.analysis.embedding_model, "text-embedding-3-small");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AppConfig::default();
        config.openai.api_key = Some("sk-test".to_string());
        config.analysis.embedding_batch_size = 0;

        assert!(create_app_state_with_config(&config).is_err());
    }
}
