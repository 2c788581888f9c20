//! Versioned API

pub mod analyze;

use axum::{routing::post, Router};

use super::state::AppState;

pub use analyze::analyze_logs;

pub fn create_v1_router() -> Router<AppState> {
    Router::new().route("/analyze-logs", post(analyze_logs))
}
