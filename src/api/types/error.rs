//! JSON error envelope for the HTTP API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisError, DomainError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    NotFoundError,
    ServerError,
    ServiceUnavailableError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::ServerError => write!(f, "server_error"),
            Self::ServiceUnavailableError => write!(f, "service_unavailable_error"),
        }
    }
}

/// `{"error": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    param: None,
                    code: None,
                },
            },
        }
    }

    /// Name the offending form field
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.response.error.param = Some(param.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorType::ServiceUnavailableError,
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        let message = err.to_string();
        let api_error = match &err {
            AnalysisError::EmptyOrInvalidLogFile { .. } => Self::bad_request(message).with_param("file"),
            AnalysisError::EmbeddingService { .. } => Self::unavailable(message),
            // LLM failures degrade inside the pipeline; one reaching here is a bug
            AnalysisError::LlmService(_)
            | AnalysisError::LlmResponseParse(_)
            | AnalysisError::UnknownPricingModel(_)
            | AnalysisError::Internal(_) => Self::internal(message),
        };

        api_error.with_code(err.code())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::Provider { provider, message } => {
                Self::unavailable(format!("{}: {}", provider, message))
            }
            DomainError::Configuration { message } | DomainError::Internal { message } => {
                Self::internal(message)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_error_status_mapping() {
        let cases = [
            (AnalysisError::empty_or_invalid("nothing"), StatusCode::BAD_REQUEST),
            (
                AnalysisError::embedding_service(0, DomainError::provider("openai", "HTTP 503")),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (AnalysisError::unknown_pricing_model("gpt-9"), StatusCode::INTERNAL_SERVER_ERROR),
            (AnalysisError::internal("stage order"), StatusCode::INTERNAL_SERVER_ERROR),
            (AnalysisError::llm_service("reset"), StatusCode::INTERNAL_SERVER_ERROR),
            (AnalysisError::llm_response_parse("not json"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status, expected);
        }
    }

    #[test]
    fn test_error_envelope_serialization() {
        let err = ApiError::from(AnalysisError::empty_or_invalid("No records"));

        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["error"]["type"], "invalid_request_error");
        assert_eq!(json["error"]["code"], "empty_or_invalid_log_file");
        assert_eq!(json["error"]["param"], "file");
        assert!(json["error"]["message"].as_str().unwrap().contains("No records"));
    }

    #[test]
    fn test_domain_error_conversion() {
        let err = ApiError::from(DomainError::validation("Unsupported log format 'xml'"));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.to_string().starts_with("invalid_request_error"));

        let err = ApiError::from(DomainError::configuration("bad"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
