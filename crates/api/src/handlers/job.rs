//! Handler for `/api/job`: runner completion reports.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use aura_core::keys::KeyScope;
use aura_core::status::JobStatus;
use aura_db::repositories::{JobRepo, RunnerRepo};

use crate::auth;
use crate::engine::deps;
use crate::error::{AppError, AppResult};
use crate::protocol::{Empty, JobRequest};
use crate::state::AppState;
use crate::submit;

/// POST /api/job
///
/// Records the job outcome and returns immediately; dependency propagation
/// and the external status push run on a detached task. The caller is a
/// runner that is about to drop the job, so nothing here may block on
/// downstream work.
pub async fn complete(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<Empty>> {
    let now = chrono::Utc::now().timestamp();
    let req: JobRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("unable to parse json object".into()))?;

    let runner = RunnerRepo::find_by_name(&state.pool, &req.name)
        .await?
        .ok_or_else(|| AppError::BadRequest("unknown runner".into()))?;
    let token = auth::bearer_token(&headers)?;
    auth::authorize(&state.pool, KeyScope::Runner, Some(&runner.key_hash), token).await?;

    let job = JobRepo::find_by_id(&state.pool, req.id)
        .await?
        .ok_or_else(|| AppError::NotFound("unknown job".into()))?;

    let status = if req.exit_code == 0 {
        JobStatus::Succeeded
    } else {
        JobStatus::Failed
    };

    let done = JobRepo::mark_done(&state.pool, req.id, status, req.exit_code, now).await?;
    if done {
        tracing::info!(
            job_id = req.id,
            status = status.name(),
            exit_code = req.exit_code,
            runner = %runner.name,
            "Job completed",
        );

        let state = state.clone();
        let entity_id = job.entity_id;
        tokio::spawn(async move {
            if let Err(e) = deps::propagate_completion(&state.pool, req.id, status, now).await {
                tracing::error!(job_id = req.id, error = %e, "Dependency propagation failed");
            }
            submit::update_entity_status(&state.pool, &state.endpoints, entity_id).await;
        });
    } else {
        // Already terminal: a cascade got here first. The first write wins.
        tracing::debug!(job_id = req.id, "Completion report for a terminal job");
    }

    Ok(Json(Empty {}))
}
