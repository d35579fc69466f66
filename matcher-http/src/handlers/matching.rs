use axum::{extract::State, Json};
use resume_matcher::{MatchReport, MatcherError};
use std::sync::Arc;

use super::AppState;
use crate::dto::MatchRequest;

/// POST /match
pub async fn match_job(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchReport>, MatcherError> {
    let report = state
        .matcher
        .match_job(&req.job_description, req.top_k)
        .await?;
    Ok(Json(report))
}
