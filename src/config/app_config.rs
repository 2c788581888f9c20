use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use crate::domain::{DomainError, ModelPricing, PricingTable};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub openai: OpenAiConfig,
    pub analysis: AnalysisConfig,
    /// Per-model price overrides, keyed by model id
    pub pricing: HashMap<String, PricingOverride>,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// Falls back to `OPENAI_API_KEY` when unset
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub embedding_model: String,
    pub analysis_model: String,
    pub top_n_similar_logs: usize,
    pub max_logs_for_analysis: usize,
    pub max_returned_logs: usize,
    pub embedding_batch_size: usize,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PricingOverride {
    pub input_per_1k: f64,
    #[serde(default)]
    pub output_per_1k: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            embedding_model: "text-embedding-3-small".to_string(),
            analysis_model: "gpt-4o-mini".to_string(),
            top_n_similar_logs: 100,
            max_logs_for_analysis: 50,
            max_returned_logs: 20,
            embedding_batch_size: 200,
            temperature: 0.1,
            max_output_tokens: 4000,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Number of ranked logs actually sent to the LLM
    pub fn effective_analysis_cap(&self) -> usize {
        self.max_logs_for_analysis.min(self.top_n_similar_logs)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let counts = [
            ("top_n_similar_logs", self.top_n_similar_logs),
            ("max_logs_for_analysis", self.max_logs_for_analysis),
            ("max_returned_logs", self.max_returned_logs),
            ("embedding_batch_size", self.embedding_batch_size),
        ];

        if let Some((name, _)) = counts.iter().find(|(_, value)| *value == 0) {
            return Err(DomainError::configuration(format!(
                "analysis.{} must be greater than zero",
                name
            )));
        }

        for (name, model) in [
            ("embedding_model", &self.embedding_model),
            ("analysis_model", &self.analysis_model),
        ] {
            if model.trim().is_empty() {
                return Err(DomainError::configuration(format!(
                    "analysis.{} must not be empty",
                    name
                )));
            }
        }

        if self.max_logs_for_analysis > self.top_n_similar_logs {
            warn!(
                max_logs_for_analysis = self.max_logs_for_analysis,
                top_n_similar_logs = self.top_n_similar_logs,
                "max_logs_for_analysis exceeds top_n_similar_logs; at most {} logs will be analyzed",
                self.top_n_similar_logs
            );
        }

        Ok(())
    }
}

impl AppConfig {
    /// Load from `config/default`, `config/local` and `APP__*` environment variables
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::from_builder(
            config::Config::builder()
                .add_source(config::File::with_name("config/default").required(false))
                .add_source(config::File::with_name("config/local").required(false))
                .add_source(
                    config::Environment::with_prefix("APP")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.analysis.validate()?;

        if self.server.max_upload_bytes == 0 {
            return Err(DomainError::configuration(
                "server.max_upload_bytes must be greater than zero",
            ));
        }

        Ok(())
    }

    /// API key from config, or the `OPENAI_API_KEY` environment variable
    pub fn resolved_api_key(&self) -> Option<String> {
        self.openai
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Built-in prices with the configured overrides applied
    pub fn pricing_table(&self) -> PricingTable {
        PricingTable::with_defaults().with_overrides(self.pricing.iter().map(|(model, price)| {
            (
                model.clone(),
                ModelPricing::new(price.input_per_1k, price.output_per_1k),
            )
        }))
    }
}
