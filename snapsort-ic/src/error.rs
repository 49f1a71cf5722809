//! Error types for snapsort-ic
//!
//! Only two failures cross the HTTP boundary: upload problems (400) and
//! classification that still failed after every retry (500).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::RetryExhausted;

/// Problems with the uploaded file itself
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no file part found in multipart body")]
    MissingFile,

    #[error("unreadable multipart body: {0}")]
    Multipart(String),

    #[error("uploaded file is empty")]
    EmptyFile,

    #[error("uploaded file is not an image (detected {0})")]
    NotAnImage(String),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Upload-level failure (400)
    #[error("Image upload failed: {0}")]
    Upload(#[from] UploadError),

    /// Classification failed after retries were exhausted (500)
    #[error("Classification failed: {0}")]
    ClassificationFailed(#[from] RetryExhausted),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::Upload(_) => (StatusCode::BAD_REQUEST, "UPLOAD_ERROR"),
            ApiError::ClassificationFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CLASSIFICATION_FAILED")
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_error_maps_to_400() {
        let response = ApiError::from(UploadError::MissingFile).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_message_embeds_cause() {
        let err = ApiError::from(UploadError::NotAnImage("application/pdf".to_string()));
        assert_eq!(
            err.to_string(),
            "Image upload failed: uploaded file is not an image (detected application/pdf)"
        );
    }
}
