//! Handlers for `/api/submit` and `/api/submit/{integration}`.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::protocol::SubmitResponse;
use crate::state::AppState;
use crate::submit;

/// POST /api/submit
pub async fn submit_generic(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<SubmitResponse>> {
    run_submit(state, "", headers, body).await
}

/// POST /api/submit/{integration}
pub async fn submit_integration(
    State(state): State<AppState>,
    Path(integration): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<SubmitResponse>> {
    run_submit(state, &integration, headers, body).await
}

async fn run_submit(
    state: AppState,
    suffix: &str,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<SubmitResponse>> {
    let endpoint = state
        .endpoints
        .get(suffix)
        .ok_or_else(|| AppError::NotFound("invalid submission endpoint".into()))?
        .clone();

    let submission = endpoint.parse_request(&state.pool, &headers, &body).await?;
    let now = chrono::Utc::now().timestamp();
    let job_id = submit::submit(&state, submission, now).await?;
    Ok(Json(SubmitResponse { id: job_id }))
}
