//! Image classification endpoint
//!
//! POST /classify (and POST /api/tags, the route older clients call)
//!
//! **Request:** `multipart/form-data` with one file part (conventionally named `file`)
//! **Response:** `{"className": "Shopping" | "Document" | "Music" | "Other"}`
//!
//! **Errors:**
//! - 400 Bad Request: no file part, unreadable body, empty or non-image file
//! - 500 Internal Server Error: classification still failing after all retries

use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        Multipart, State,
    },
    routing::post,
    Json, Router,
};
use snapsort_common::ClassificationResult;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, UploadError};
use crate::models::UploadedImage;
use crate::services::classify_with_retry;
use crate::AppState;

/// Multipart field name clients are expected to use
pub const UPLOAD_FIELD: &str = "file";

/// Whether a multipart part carries a file rather than a plain form value
fn is_file_part(field: &Field<'_>) -> bool {
    field.name() == Some(UPLOAD_FIELD)
        || field.file_name().is_some()
        || field
            .content_type()
            .is_some_and(|content_type| !content_type.starts_with("text/"))
}

/// First part that carries a file
async fn read_image(mut multipart: Multipart) -> Result<UploadedImage, UploadError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Multipart(e.to_string()))?
    {
        if !is_file_part(&field) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| UploadError::Multipart(e.to_string()))?;

        return UploadedImage::from_upload(bytes, content_type.as_deref(), file_name);
    }

    Err(UploadError::MissingFile)
}

/// POST /classify
pub async fn classify_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ClassificationResult>> {
    let multipart = multipart.map_err(|e| UploadError::Multipart(e.body_text()))?;
    let image = read_image(multipart).await?;

    let span = info_span!("classify", request_id = %Uuid::new_v4());
    async move {
        info!(
            media_type = %image.media_type,
            size_bytes = image.len(),
            file_name = image.file_name.as_deref().unwrap_or("-"),
            "Classifying uploaded image"
        );

        let outcome =
            classify_with_retry(state.classifier.as_ref(), &image, state.retry_policy).await?;

        Ok::<_, ApiError>(Json(outcome.result))
    }
    .instrument(span)
    .await
}

/// Build classification routes
pub fn classify_routes() -> Router<AppState> {
    Router::new()
        .route("/classify", post(classify_image))
        .route("/api/tags", post(classify_image))
}
