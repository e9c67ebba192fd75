//! Wire types for the Aura HTTP API.
//!
//! All request and response bodies are JSON. Field names here are the
//! protocol; changing them breaks runners and submitters.

use std::collections::HashMap;

use aura_core::types::{DbId, UnixTime};
use serde::{Deserialize, Serialize};

/// Error body returned with any 4xx or 5xx status code.
#[derive(Debug, Serialize, Deserialize)]
pub struct Status {
    pub code: u16,
    pub message: String,
}

/// Intentionally empty `{}` success body.
#[derive(Debug, Serialize)]
pub struct Empty {}

// ---------------------------------------------------------------------------
// /api/submit
// ---------------------------------------------------------------------------

/// Submit a new job.
///
/// Auth: project key, job key of `parentJob` (which pins the target entity
/// and forbids `collections`), or admin key.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    /// Id of the job submitting this child job. Set iff a job key is used.
    #[serde(default)]
    pub parent_job: Option<DbId>,

    /// Slug of the project to attach the job to.
    #[serde(default)]
    pub project: String,

    /// The entity to attach this job to; created on first use.
    #[serde(default)]
    pub entity_key: String,
    #[serde(default)]
    pub entity_val: String,

    /// Name of the new job.
    #[serde(default)]
    pub name: String,

    /// Command to run. Shell availability depends on the runner.
    #[serde(default)]
    pub cmd: String,

    /// `.env`-style content: newline-separated KEY=value lines, first `=`
    /// delimits, no escaping.
    #[serde(default)]
    pub env: String,

    /// Tag used to find a usable runner.
    #[serde(default)]
    pub tag: String,

    /// Collections to include the entity in. Project/admin key only.
    #[serde(default)]
    pub collections: HashMap<String, String>,

    /// Jobs that must succeed before this one may start. If one of them
    /// fails or is cancelled, this job is cancelled.
    #[serde(default)]
    pub preceding_jobs: Vec<DbId>,

    /// Earliest possible start, unix seconds. Absent means unrestricted.
    #[serde(default)]
    pub earliest_start: Option<UnixTime>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    /// Id of the newly created job.
    pub id: DbId,
}

// ---------------------------------------------------------------------------
// /api/runner
// ---------------------------------------------------------------------------

/// Runner check-in: request new jobs, or just report liveness.
#[derive(Debug, Deserialize)]
pub struct RunnerRequest {
    /// Name of the runner sending the request.
    pub name: String,

    /// Tags this runner requests jobs for, sorted by priority.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Number of jobs to return. 0 checks in without requesting work.
    #[serde(default)]
    pub limit: i64,
}

#[derive(Debug, Serialize)]
pub struct RunnerResponse {
    pub jobs: Vec<RunnerJob>,
}

/// A reserved job handed to a runner. `jobKey` is the single-use plaintext
/// credential valid for this job's lifetime.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerJob {
    pub id: DbId,
    /// The project slug.
    pub project: String,
    pub entity_key: String,
    pub entity_val: String,
    pub name: String,
    pub job_key: String,
    pub cmd: String,
    pub env: String,
    pub tag: String,
}

// ---------------------------------------------------------------------------
// /api/job
// ---------------------------------------------------------------------------

/// Runner-to-controller completion report.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    /// Name of the runner sending the request.
    pub name: String,

    /// Id of the job that just finished.
    pub id: DbId,

    /// Exit code of that job; 0 means success.
    #[serde(default)]
    pub exit_code: i64,
}
