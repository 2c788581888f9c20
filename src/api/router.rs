use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::{logging_middleware, metrics_middleware, UuidRequestId};
use super::state::AppState;
use super::types::ApiError;
use super::v1;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Build the HTTP router. `metrics` adds the Prometheus scrape endpoint.
pub fn create_router(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let max_upload_bytes = state.config.server.max_upload_bytes;
    let metrics_path = state.config.metrics.path.clone();

    let mut router = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        // Path served before versioning
        .route("/analyze-logs", post(v1::analyze_logs))
        .nest("/v1", v1::create_v1_router())
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware));

    if let Some(metrics) = metrics {
        router = router.merge(create_metrics_router(metrics, &metrics_path));
    }

    router
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::api::types::form::test_support::multipart_request;
    use crate::config::AppConfig;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::llm::MockLlmProvider;

    const LOGS: &str = "{\"level\":\"error\",\"message\":\"cart crashed\"}\n{\"level\":\"info\",\"message\":\"login ok\"}\n";

    fn llm_answer() -> String {
        json!({
            "summary": "Cart service crashed",
            "logs": [
                {"log_id": 1, "relevance_score": 0.9, "relevance_reason": "crash"},
                {"log_id": 2, "relevance_score": 0.1, "relevance_reason": "unrelated"}
            ]
        })
        .to_string()
    }

    fn app_with(config: AppConfig) -> Router {
        let service = crate::build_analysis_service(
            &config,
            Arc::new(MockEmbeddingProvider::new(8)),
            Arc::new(MockLlmProvider::new("mock").with_content(llm_answer(), None)),
        )
        .unwrap();

        create_router(AppState::new(service, config), None)
    }

    fn app() -> Router {
        app_with(AppConfig::default())
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Log Analysis API is running");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_health_and_live() {
        let health = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);
        assert_eq!(body_json(health).await["status"], "healthy");

        let live = app()
            .oneshot(Request::builder().uri("/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(live.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_analyze_logs() {
        let response = app()
            .oneshot(multipart_request(
                "/v1/analyze-logs",
                &[("file", LOGS), ("prompt", "cart is crashing"), ("format", "jsonl")],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["total_logs_processed"], 2);
        assert_eq!(json["filtered_logs_count"], 2);
        assert_eq!(json["highlighted_logs_count"], 2);
        assert_eq!(json["analysis_summary"], "Cart service crashed");
        assert_eq!(json["analysis_status"], "completed");
        assert_eq!(json["prompt"], "cart is crashing");
    }

    #[tokio::test]
    async fn test_unversioned_path() {
        let response = app()
            .oneshot(multipart_request("/analyze-logs", &[("file", LOGS), ("prompt", "cart")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_prompt_is_bad_request() {
        let response = app()
            .oneshot(multipart_request("/v1/analyze-logs", &[("file", LOGS)]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], "invalid_request_error");
        assert_eq!(json["error"]["param"], "prompt");
    }

    #[tokio::test]
    async fn test_invalid_log_file_is_bad_request() {
        let response = app()
            .oneshot(multipart_request(
                "/v1/analyze-logs",
                &[("file", "not json\nstill not json"), ("prompt", "cart")],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "empty_or_invalid_log_file");
    }

    #[tokio::test]
    async fn test_upload_limit() {
        let mut config = AppConfig::default();
        config.server.max_upload_bytes = 64;
        let big = LOGS.repeat(20);

        let response = app_with(config)
            .oneshot(multipart_request("/v1/analyze-logs", &[("prompt", "cart"), ("file", &big)]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/live")
                    .header("x-request-id", "incident-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "incident-42");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = app()
            .oneshot(Request::builder().uri("/v1/chat/completions").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], "not_found_error");
    }
}
