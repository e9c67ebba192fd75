//! The generic JSON submit endpoint, mounted at `/api/submit`.

use async_trait::async_trait;
use axum::http::HeaderMap;

use aura_core::keys::{self, KeyScope};
use aura_core::slug::is_valid_slug;
use aura_db::repositories::{EntityRepo, JobRepo, ProjectRepo};
use aura_db::DbPool;

use crate::auth;
use crate::error::{AppError, AppResult};
use crate::protocol::SubmitRequest;
use crate::submit::Submission;

/// Accepts a [`SubmitRequest`], authenticated by a project key, the job key
/// of `parentJob`, or the admin key.
///
/// When a job key is used, the submission is pinned to the parent's entity
/// and may not touch collections. Referenced `precedingJobs` must exist:
/// unknown ids are a 400 here, while integration endpoints skip them
/// silently; operators should be aware of the asymmetry.
pub struct GenericEndpoint;

#[async_trait]
impl super::SubmitEndpoint for GenericEndpoint {
    async fn parse_request(
        &self,
        pool: &DbPool,
        headers: &HeaderMap,
        body: &[u8],
    ) -> AppResult<Submission> {
        let req: SubmitRequest = serde_json::from_slice(body)
            .map_err(|_| AppError::BadRequest("unable to parse json object".into()))?;

        let project = ProjectRepo::find_by_slug(pool, &req.project)
            .await?
            .ok_or_else(|| AppError::BadRequest("unknown project".into()))?;

        let token = auth::bearer_token(headers)?;

        let authorized = if keys::scope_of(token) == Some(KeyScope::Job) && req.parent_job.is_some()
        {
            let parent_id = req.parent_job.unwrap_or_default();
            let parent = JobRepo::find_by_id(pool, parent_id)
                .await?
                .ok_or_else(|| AppError::BadRequest("unknown parent job".into()))?;
            let parent_entity = EntityRepo::find_by_id(pool, parent.entity_id)
                .await?
                .ok_or_else(|| AppError::Internal("parent job has no entity".into()))?;

            if project.id != parent_entity.project_id {
                return Err(AppError::Unauthorized(
                    "project does not match parent job project".into(),
                ));
            }
            if req.entity_key != parent_entity.key {
                return Err(AppError::Unauthorized(
                    "entityKey does not match parent job entityKey".into(),
                ));
            }
            if req.entity_val != parent_entity.val {
                return Err(AppError::Unauthorized(
                    "entityVal does not match parent job entityVal".into(),
                ));
            }
            if !req.collections.is_empty() {
                return Err(AppError::Unauthorized(
                    "may not set collections when using a job key".into(),
                ));
            }

            auth::check_scoped(pool, KeyScope::Job, parent.key_hash.as_deref(), token).await?
        } else {
            for (key, value) in &req.collections {
                if !is_valid_slug(key) {
                    return Err(AppError::BadRequest("invalid collection key".into()));
                }
                if !is_valid_slug(value) {
                    return Err(AppError::BadRequest("invalid collection value".into()));
                }
            }

            auth::check_scoped(pool, KeyScope::Project, Some(&project.key_hash), token).await?
        };
        if !authorized {
            return Err(AppError::Unauthorized("unauthorized".into()));
        }

        for &preceding in &req.preceding_jobs {
            if JobRepo::find_by_id(pool, preceding).await?.is_none() {
                return Err(AppError::BadRequest("unknown preceding job".into()));
            }
        }

        Ok(Submission {
            project_id: project.id,
            entity_key: req.entity_key,
            entity_val: req.entity_val,
            name: req.name,
            cmd: req.cmd,
            env: req.env,
            tag: req.tag,
            collections: req.collections,
            preceding_jobs: req.preceding_jobs,
            earliest_start: req.earliest_start,
        })
    }

    async fn push_entity_status(
        &self,
        _pool: &DbPool,
        _project: &aura_db::models::project::Project,
        _entity: &aura_db::models::entity::Entity,
    ) {
        // The generic endpoint has no external source to report to.
    }
}
