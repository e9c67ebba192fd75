//! The submission pipeline.
//!
//! An endpoint adapter turns an inbound request into a [`Submission`]; the
//! pipeline then persists the job synchronously (so the response carries its
//! id) and finishes the slower work (collections, dependency links, the
//! Submitted -> Created flip, and the external status push) on a detached
//! task. A failure in that task never turns an accepted submission into an
//! error response; the job simply stays invisible to runners and shows up
//! on the operator's dashboard.

pub mod endpoints;

use std::collections::HashMap;

use aura_core::slug::is_valid_slug;
use aura_core::types::{DbId, UnixTime};
use aura_db::models::entity::Entity;
use aura_db::models::job::NewJob;
use aura_db::repositories::{CollectionRepo, EntityRepo, JobRepo, ProjectRepo};
use aura_db::DbPool;

use crate::engine::deps;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::submit::endpoints::EndpointRegistry;

/// A validated, project-resolved job submission. Produced by an endpoint
/// adapter, consumed by [`submit`].
#[derive(Debug)]
pub struct Submission {
    pub project_id: DbId,
    pub entity_key: String,
    pub entity_val: String,
    pub name: String,
    pub cmd: String,
    pub env: String,
    pub tag: String,
    pub collections: HashMap<String, String>,
    pub preceding_jobs: Vec<DbId>,
    pub earliest_start: Option<UnixTime>,
}

/// Persist a new job and schedule its post-processing.
///
/// Synchronous part: validate the name, find or create the entity, insert
/// the job in Submitted status. Everything that scales with the number of
/// collections or dependencies runs detached.
pub async fn submit(state: &AppState, submission: Submission, now: UnixTime) -> AppResult<DbId> {
    if !is_valid_slug(&submission.name) {
        return Err(AppError::BadRequest("invalid name".into()));
    }

    let entity = find_or_create_entity(&state.pool, &submission, now).await?;

    let earliest_start_at = submission.earliest_start.unwrap_or(now);
    let job_id = JobRepo::create(
        &state.pool,
        &NewJob {
            entity_id: entity.id,
            name: &submission.name,
            cmd: &submission.cmd,
            env: &submission.env,
            tag: &submission.tag,
            created_at: now,
            earliest_start_at,
        },
    )
    .await?;

    tracing::info!(
        job_id,
        entity_id = entity.id,
        name = %submission.name,
        tag = %submission.tag,
        "Job submitted",
    );

    let state = state.clone();
    let entity_id = entity.id;
    tokio::spawn(async move {
        if let Err(e) = post_process(&state, &submission, job_id, entity_id, now).await {
            tracing::error!(job_id, error = %e, "Submission post-processing failed");
        }
    });

    Ok(job_id)
}

async fn find_or_create_entity(
    pool: &DbPool,
    submission: &Submission,
    now: UnixTime,
) -> AppResult<Entity> {
    if let Some(entity) = EntityRepo::find(
        pool,
        submission.project_id,
        &submission.entity_key,
        &submission.entity_val,
    )
    .await?
    {
        return Ok(entity);
    }

    if !is_valid_slug(&submission.entity_key) {
        return Err(AppError::BadRequest("invalid entityKey".into()));
    }
    if !is_valid_slug(&submission.entity_val) {
        return Err(AppError::BadRequest("invalid entityVal".into()));
    }
    EntityRepo::create(
        pool,
        submission.project_id,
        &submission.entity_key,
        &submission.entity_val,
        now,
    )
    .await?;
    EntityRepo::find(
        pool,
        submission.project_id,
        &submission.entity_key,
        &submission.entity_val,
    )
    .await?
    .ok_or_else(|| AppError::Internal("entity missing after creation".into()))
}

/// The detached half of a submission.
async fn post_process(
    state: &AppState,
    submission: &Submission,
    job_id: DbId,
    entity_id: DbId,
    now: UnixTime,
) -> AppResult<()> {
    for (key, value) in &submission.collections {
        let collection = match CollectionRepo::find(&state.pool, submission.project_id, key, value)
            .await?
        {
            Some(collection) => collection,
            None => {
                CollectionRepo::create(&state.pool, submission.project_id, key, value, now).await?;
                CollectionRepo::find(&state.pool, submission.project_id, key, value)
                    .await?
                    .ok_or_else(|| AppError::Internal("collection missing after creation".into()))?
            }
        };
        CollectionRepo::insert_entity(&state.pool, collection.id, entity_id).await?;
    }

    deps::link_preceding_jobs(&state.pool, &submission.preceding_jobs, job_id, now).await?;

    // A false result means the job is no longer Submitted: dependency
    // resolution above has already cancelled it. That is the expected
    // outcome, not an error.
    JobRepo::mark_created(&state.pool, job_id).await?;

    update_entity_status(&state.pool, &state.endpoints, entity_id).await;
    Ok(())
}

/// Offer every registered endpoint the chance to push the entity's
/// rolled-up status to its external source. Failures are the endpoint's to
/// log; nothing here blocks or propagates.
pub async fn update_entity_status(pool: &DbPool, registry: &EndpointRegistry, entity_id: DbId) {
    let entity = match EntityRepo::find_by_id(pool, entity_id).await {
        Ok(Some(entity)) => entity,
        Ok(None) => return,
        Err(e) => {
            tracing::error!(entity_id, error = %e, "Failed to load entity for status update");
            return;
        }
    };
    let project = match ProjectRepo::find_by_id(pool, entity.project_id).await {
        Ok(Some(project)) => project,
        Ok(None) => return,
        Err(e) => {
            tracing::error!(entity_id, error = %e, "Failed to load project for status update");
            return;
        }
    };
    for endpoint in registry.endpoints() {
        endpoint.push_entity_status(pool, &project, &entity).await;
    }
}
