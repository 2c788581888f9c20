//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use metrics::{
    create_metrics_router, init_metrics, record_analysis_run, record_http_request,
    record_provider_request, record_provider_tokens, PrometheusMetrics, ProviderKind,
};
