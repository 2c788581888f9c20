//! Multipart form extractor for log uploads

use axum::extract::{FromRequest, Multipart, Request};
use bytes::Bytes;

use super::error::{ApiError, ApiErrorType};
use crate::domain::InputFormat;

/// Fields of an analyze-logs upload.
///
/// Rejections (missing fields, unreadable bodies, oversize uploads) are
/// reported in the API error envelope instead of axum's plain-text bodies.
#[derive(Debug, Clone)]
pub struct AnalyzeLogsForm {
    pub file: Bytes,
    pub filename: Option<String>,
    pub prompt: String,
    pub format: InputFormat,
}

impl<S> FromRequest<S> for AnalyzeLogsForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state).await.map_err(|rejection| {
            ApiError::new(rejection.status(), ApiErrorType::InvalidRequestError, rejection.body_text())
                .with_code("invalid_multipart")
        })?;

        let mut file = None;
        let mut filename = None;
        let mut prompt = None;
        let mut format = None;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                "file" => {
                    filename = field.file_name().map(str::to_string);
                    file = Some(field.bytes().await.map_err(multipart_error)?);
                }
                "prompt" => prompt = Some(field.text().await.map_err(multipart_error)?),
                "format" => format = Some(field.text().await.map_err(multipart_error)?),
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        let file = file.ok_or_else(|| {
            ApiError::bad_request("A log file is required").with_param("file")
        })?;

        let prompt = prompt
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                ApiError::bad_request("Prompt cannot be empty").with_param("prompt")
            })?;

        let format = match format {
            Some(value) => value
                .parse::<InputFormat>()
                .map_err(|e| ApiError::from(e).with_param("format"))?,
            None => InputFormat::Auto,
        };

        Ok(Self {
            file,
            filename,
            prompt,
            format,
        })
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::new(err.status(), ApiErrorType::InvalidRequestError, err.body_text())
        .with_code("invalid_multipart")
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{header, Request};

    pub const BOUNDARY: &str = "log-upload-boundary";

    /// Build a multipart POST; `file` is sent as `logs.jsonl`
    pub fn multipart_request(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            if *name == "file" {
                body.push_str(
                    "Content-Disposition: form-data; name=\"file\"; filename=\"logs.jsonl\"\r\n\
Content-Type: application/octet-stream\r\n\r\n",
                );
            } else {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                ));
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }
}
