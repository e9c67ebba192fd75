//! Job row model and creation DTO.

use aura_core::status::{JobStatus, StatusId};
use aura_core::types::{DbId, UnixTime};
use sqlx::FromRow;

/// A row from the `jobs` table.
///
/// Invariants maintained by the repository layer:
/// - `key_hash` is non-NULL iff `status_id` is Started.
/// - `runner_id` is set when the job is reserved and kept afterwards for
///   provenance.
#[derive(Debug, Clone, FromRow)]
pub struct Job {
    pub id: DbId,
    pub entity_id: DbId,
    pub name: String,
    pub status_id: StatusId,
    pub created_at: UnixTime,
    pub earliest_start_at: UnixTime,
    pub started_at: Option<UnixTime>,
    pub ended_at: Option<UnixTime>,
    pub key_hash: Option<String>,
    pub cmd: String,
    pub env: String,
    pub tag: String,
    pub runner_id: Option<DbId>,
    pub exit_code: i64,
}

impl Job {
    /// Decoded lifecycle status; `None` only for corrupted rows.
    pub fn status(&self) -> Option<JobStatus> {
        JobStatus::from_id(self.status_id)
    }
}

/// Parameters for inserting a new job. Jobs always start as Submitted.
#[derive(Debug)]
pub struct NewJob<'a> {
    pub entity_id: DbId,
    pub name: &'a str,
    pub cmd: &'a str,
    pub env: &'a str,
    pub tag: &'a str,
    pub created_at: UnixTime,
    pub earliest_start_at: UnixTime,
}
