//! Handler for `/api/runner`: runner check-in and job dispatch.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use aura_core::keys::KeyScope;
use aura_db::repositories::{EntityRepo, ProjectRepo, RunnerRepo};

use crate::auth;
use crate::engine::dispatch;
use crate::error::{AppError, AppResult};
use crate::protocol::{RunnerJob, RunnerRequest, RunnerResponse};
use crate::state::AppState;

/// POST /api/runner
///
/// Authenticates the runner, records liveness for it and each offered tag,
/// and reserves up to `limit` dispatchable jobs in tag priority order.
/// `limit: 0` is a pure check-in.
pub async fn check_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<RunnerResponse>> {
    let now = chrono::Utc::now().timestamp();
    let req: RunnerRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("unable to parse json object".into()))?;

    let runner = RunnerRepo::find_by_name(&state.pool, &req.name)
        .await?
        .ok_or_else(|| AppError::BadRequest("unknown runner".into()))?;
    let token = auth::bearer_token(&headers)?;
    auth::authorize(&state.pool, KeyScope::Runner, Some(&runner.key_hash), token).await?;

    state.checkins.record_runner(&runner.name, now);
    for tag in &req.tags {
        state.checkins.record_tag(tag, now);
    }

    let reserved =
        dispatch::reserve_for_runner(&state.pool, runner.id, &req.tags, req.limit, now).await?;

    let mut jobs = Vec::with_capacity(reserved.len());
    for item in reserved {
        let entity = EntityRepo::find_by_id(&state.pool, item.job.entity_id)
            .await?
            .ok_or_else(|| AppError::Internal("reserved job has no entity".into()))?;
        let project = ProjectRepo::find_by_id(&state.pool, entity.project_id)
            .await?
            .ok_or_else(|| AppError::Internal("entity has no project".into()))?;
        jobs.push(RunnerJob {
            id: item.job.id,
            project: project.slug,
            entity_key: entity.key,
            entity_val: entity.val,
            name: item.job.name,
            job_key: item.job_key,
            cmd: item.job.cmd,
            env: item.job.env,
            tag: item.job.tag,
        });
    }

    Ok(Json(RunnerResponse { jobs }))
}
