//! Service info and health endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::state::AppState;

#[derive(Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
}

/// Health response with the configured pipeline models
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub embedding_model: String,
    pub analysis_model: String,
}

pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Log Analysis API is running",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let analysis = &state.config.analysis;
    let response = HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        embedding_model: analysis.embedding_model.clone(),
        analysis_model: analysis.analysis_model.clone(),
    };

    (StatusCode::OK, Json(response))
}

/// Liveness probe
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}
