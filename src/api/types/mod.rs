//! Request and response types of the HTTP API

mod analysis;
mod error;
pub(crate) mod form;

pub use analysis::{AnalyzeLogsResponse, FilteredLogResponse};
pub use error::{ApiError, ApiErrorDetail, ApiErrorResponse, ApiErrorType};
pub use form::AnalyzeLogsForm;
