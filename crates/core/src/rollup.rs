//! Aggregate state of an entity's job roster.
//!
//! Integrations that push commit statuses back to a forge reduce all jobs of
//! an entity to a single state plus a human-readable count summary.

use crate::status::JobStatus;

/// Rolled-up state of an entity's jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRollup {
    /// `"pending"`, `"failure"`, or `"success"`.
    pub state: &'static str,
    /// Comma-joined non-zero counts, e.g. `"2 queued, 1 running, 1 failed"`.
    pub description: String,
}

/// Reduce a job roster to its aggregate state.
///
/// Submitted and Created count as queued. Cancelled jobs are reported but do
/// not produce a failure state on their own.
pub fn entity_rollup(statuses: &[JobStatus]) -> EntityRollup {
    let mut queued = 0;
    let mut running = 0;
    let mut cancelled = 0;
    let mut succeeded = 0;
    let mut failed = 0;
    for status in statuses {
        match status {
            JobStatus::Submitted | JobStatus::Created => queued += 1,
            JobStatus::Started => running += 1,
            JobStatus::Cancelled => cancelled += 1,
            JobStatus::Succeeded => succeeded += 1,
            JobStatus::Failed => failed += 1,
        }
    }

    let mut parts = Vec::new();
    if queued > 0 {
        parts.push(format!("{queued} queued"));
    }
    if running > 0 {
        parts.push(format!("{running} running"));
    }
    if cancelled > 0 {
        parts.push(format!("{cancelled} cancelled"));
    }
    if succeeded > 0 {
        parts.push(format!("{succeeded} succeeded"));
    }
    if failed > 0 {
        parts.push(format!("{failed} failed"));
    }

    let state = if queued > 0 || running > 0 {
        "pending"
    } else if failed > 0 {
        "failure"
    } else {
        "success"
    };

    EntityRollup {
        state,
        description: parts.join(", "),
    }
}
