use axum::extract::{Multipart, State};
use axum::Json;
use resume_matcher::MatcherError;
use std::sync::Arc;

use super::AppState;
use crate::dto::UploadResponse;

/// POST /upload_resume: multipart form with the PDF in field `file`.
pub async fn upload_resume(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, MatcherError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| MatcherError::InvalidRequest(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| MatcherError::InvalidRequest(format!("failed to read upload: {e}")))?;
        tracing::debug!(filename = %filename, bytes = bytes.len(), "Resume upload received");

        let receipt = state
            .matcher
            .upload_resume(&filename, bytes.to_vec())
            .await?;
        return Ok(Json(receipt.into()));
    }
    Err(MatcherError::InvalidRequest(
        "multipart field `file` is required".into(),
    ))
}
