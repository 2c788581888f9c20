//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsConfig;

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the global Prometheus recorder. `None` when disabled or already installed.
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("incident_log_analyzer_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Router serving the rendered metrics at `path`
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric. `path` should be the matched route template.
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// External API family a call went to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Embedding,
    Llm,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Embedding => "embedding",
            Self::Llm => "llm",
        }
    }
}

pub fn record_provider_request(kind: ProviderKind, model: &str, success: bool) {
    let labels = [
        ("kind", kind.as_str().to_string()),
        ("model", model.to_string()),
        ("status", if success { "success" } else { "error" }.to_string()),
    ];

    counter!("provider_requests_total", &labels).increment(1);
}

/// `direction` is `input` or `output`
pub fn record_provider_tokens(kind: ProviderKind, model: &str, direction: &'static str, tokens: u64) {
    let labels = [
        ("kind", kind.as_str().to_string()),
        ("model", model.to_string()),
        ("direction", direction.to_string()),
    ];

    counter!("provider_tokens_total", &labels).increment(tokens);
}

/// Record the outcome of one analysis run
pub fn record_analysis_run(outcome: &'static str, records: usize, cost_usd: f64) {
    counter!("log_analysis_runs_total", "outcome" => outcome).increment(1);
    counter!("log_analysis_records_total").increment(records as u64);
    counter!("analysis_cost_microdollars_total").increment(to_microdollars(cost_usd));
}

/// USD to whole micro-dollars; negative and NaN amounts count as zero
fn to_microdollars(cost_usd: f64) -> u64 {
    (cost_usd * 1_000_000.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_labels() {
        assert_eq!(ProviderKind::Embedding.as_str(), "embedding");
        assert_eq!(ProviderKind::Llm.as_str(), "llm");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_http_request("POST", "/v1/analyze-logs", 200, Duration::from_millis(12));
        record_provider_request(ProviderKind::Llm, "gpt-4o-mini", false);
        record_provider_tokens(ProviderKind::Embedding, "text-embedding-3-small", "input", 42);
        record_analysis_run("completed", 10, 0.0001);
    }

    #[test]
    fn test_cost_is_counted_in_microdollars() {
        assert_eq!(to_microdollars(0.0001), 100);
        assert_eq!(to_microdollars(0.0000004), 0);
        assert_eq!(to_microdollars(1.25), 1_250_000);
        assert_eq!(to_microdollars(f64::NAN), 0);
        assert_eq!(to_microdollars(-0.5), 0);
    }

    #[test]
    fn test_disabled_metrics_returns_none() {
        let config = MetricsConfig {
            enabled: false,
            path: "/metrics".to_string(),
        };

        assert!(init_metrics(&config).is_none());
    }
}
