//! Log analysis endpoint

use axum::{extract::State, Json};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{AnalyzeLogsForm, AnalyzeLogsResponse, ApiError};

/// POST /v1/analyze-logs
pub async fn analyze_logs(
    State(state): State<AppState>,
    form: AnalyzeLogsForm,
) -> Result<Json<AnalyzeLogsResponse>, ApiError> {
    info!(
        filename = form.filename.as_deref().unwrap_or("<unnamed>"),
        bytes = form.file.len(),
        format = %form.format,
        "Analyze logs request"
    );

    let result = state
        .analysis_service
        .analyze(&form.file, &form.prompt, form.format)
        .await?;

    Ok(Json(AnalyzeLogsResponse::from(result)))
}
