//! Job lifecycle status machine.
//!
//! The numeric values are the on-disk representation in the `jobs` table.
//! A job advances monotonically along one of:
//!
//! ```text
//! Submitted -> Created -> Started -> Succeeded | Failed
//! Submitted -> Created -> Cancelled
//! Submitted -> Cancelled            (pre-creation cascade)
//! ```

/// Status ID type matching the INTEGER column in the `jobs` table.
pub type StatusId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum JobStatus {
    Created = 0,
    Started = 1,
    Cancelled = 2,
    Succeeded = 3,
    Failed = 4,
    Submitted = 5,
}

impl JobStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Decode a database status ID; `None` for anything out of range.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            0 => Some(JobStatus::Created),
            1 => Some(JobStatus::Started),
            2 => Some(JobStatus::Cancelled),
            3 => Some(JobStatus::Succeeded),
            4 => Some(JobStatus::Failed),
            5 => Some(JobStatus::Submitted),
            _ => None,
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Cancelled | JobStatus::Succeeded | JobStatus::Failed
        )
    }

    /// Lowercase display name.
    pub fn name(self) -> &'static str {
        match self {
            JobStatus::Created => "created",
            JobStatus::Started => "started",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Submitted => "submitted",
        }
    }
}

impl From<JobStatus> for StatusId {
    fn from(value: JobStatus) -> Self {
        value as StatusId
    }
}
