//! Handler for `/api/storage/{jobId}/{name}`: per-job artifact uploads.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use aura_core::keys::{self, KeyScope};
use aura_db::repositories::{JobRepo, RunnerRepo};

use crate::auth;
use crate::error::{AppError, AppResult};
use crate::protocol::Empty;
use crate::state::AppState;

/// POST /api/storage/{jobId}/{name}
///
/// Accepts raw bytes and persists them at `artifacts/{jobId}/{name}`. The
/// only allowed name is `log`. Authorisation is checked against the job's
/// current row: the key of the runner the job is assigned to, the job's own
/// key (live only while the job is started), or the admin key. Last write
/// wins.
pub async fn upload(
    State(state): State<AppState>,
    Path((job_id, name)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<Empty>> {
    if name != "log" {
        return Err(AppError::BadRequest("invalid storage path".into()));
    }
    let job_id: i64 = job_id
        .parse()
        .map_err(|_| AppError::BadRequest("invalid job id".into()))?;

    let job = JobRepo::find_by_id(&state.pool, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("unknown job".into()))?;

    let token = auth::bearer_token(&headers)?;
    let authorized = if keys::scope_of(token) == Some(KeyScope::Runner) {
        match job.runner_id {
            Some(runner_id) => {
                let runner = RunnerRepo::find_by_id(&state.pool, runner_id)
                    .await?
                    .ok_or_else(|| AppError::Internal("job assigned to unknown runner".into()))?;
                auth::check_scoped(&state.pool, KeyScope::Runner, Some(&runner.key_hash), token)
                    .await?
            }
            // A runner key can only write for the job's assigned runner.
            None => false,
        }
    } else {
        auth::check_scoped(&state.pool, KeyScope::Job, job.key_hash.as_deref(), token).await?
    };
    if !authorized {
        return Err(AppError::Unauthorized("unauthorized".into()));
    }

    let dir = state.config.artifacts_dir.join(job_id.to_string());
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::Internal(format!("failed to create artifact directory: {e}")))?;
    tokio::fs::write(dir.join(&name), &body)
        .await
        .map_err(|e| AppError::Internal(format!("failed to write artifact: {e}")))?;

    tracing::info!(job_id, name = %name, bytes = body.len(), "Artifact stored");
    Ok(Json(Empty {}))
}
