/// Repository trait for job persistence
///
/// Defines the interface for job storage and retrieval operations. Writes go
/// through `JobChangeset` partial updates so independent fields (progress,
/// status) never clobber each other via read-modify-write.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::modules::jobs::domain::entities::{JobRecord, JobStatus, NewJobRecord};
use crate::shared::errors::AppResult;

/// Stored error messages are capped; anything longer is cut at a char
/// boundary with a marker suffix.
const MAX_STORED_ERROR_LEN: usize = 500;

#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Persist a new job: status=pending, progress=0
    async fn create(&self, new_job: NewJobRecord) -> AppResult<JobRecord>;

    /// Get a job by id; None when it does not exist
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<JobRecord>>;

    /// All jobs, newest first
    async fn get_all(&self) -> AppResult<Vec<JobRecord>>;

    /// Atomically transition pending -> running and stamp started_at.
    /// Returns false when the job is no longer pending, so a redelivered
    /// reference cannot be claimed twice.
    async fn claim(&self, id: Uuid) -> AppResult<bool>;

    /// Apply a partial update; unknown id is a NotFound error
    async fn update(&self, id: Uuid, changes: JobChangeset) -> AppResult<()>;

    /// Delete a job regardless of status; unknown id is a NotFound error
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Bulk delete by status; returns how many were removed
    async fn delete_by_status(&self, status: JobStatus) -> AppResult<usize>;

    /// Jobs stuck in running since before `cutoff` (reconciliation)
    async fn find_stale_running(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<JobRecord>>;

    /// Pending jobs created before `cutoff` (redelivery after drops/restarts)
    async fn find_stale_pending(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<JobRecord>>;

    /// Counts per status
    async fn get_statistics(&self) -> AppResult<JobStatistics>;
}

/// Job queue statistics
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct JobStatistics {
    pub pending_count: i64,
    pub running_count: i64,
    pub completed_count: i64,
    pub failed_count: i64,
    pub cancelled_count: i64,
    pub total_count: i64,
}

/// Partial update over a job record
///
/// Outer `None` leaves the column untouched; for nullable columns the inner
/// `Option` distinguishes "set to value" from "set to NULL".
#[derive(Debug, Clone, Default)]
pub struct JobChangeset {
    pub status: Option<JobStatus>,
    pub progress: Option<i32>,
    pub result: Option<Option<JsonValue>>,
    pub error: Option<Option<String>>,
    pub started_at: Option<Option<DateTime<Utc>>>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl JobChangeset {
    /// Progress update; clamped to 0..=100
    pub fn progress(percent: i32) -> Self {
        Self {
            progress: Some(percent.clamp(0, 100)),
            ..Default::default()
        }
    }

    /// Successful completion: result set, error untouched (never set)
    pub fn completed(result: JsonValue) -> Self {
        Self {
            status: Some(JobStatus::Completed),
            progress: Some(100),
            result: Some(Some(result)),
            completed_at: Some(Some(Utc::now())),
            ..Default::default()
        }
    }

    /// Failure: error message stored (truncated), result cleared
    pub fn failed(message: &str) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            result: Some(None),
            error: Some(Some(truncate_error(message))),
            completed_at: Some(Some(Utc::now())),
            ..Default::default()
        }
    }

    /// Cooperative cancellation observed: terminal timestamp, nothing else
    pub fn cancelled() -> Self {
        Self {
            status: Some(JobStatus::Cancelled),
            completed_at: Some(Some(Utc::now())),
            ..Default::default()
        }
    }

    /// Retry reset: back to pending with progress, outcome and times cleared
    pub fn retry_reset() -> Self {
        Self {
            status: Some(JobStatus::Pending),
            progress: Some(0),
            result: Some(None),
            error: Some(None),
            started_at: Some(None),
            completed_at: Some(None),
        }
    }
}

fn truncate_error(message: &str) -> String {
    if message.len() <= MAX_STORED_ERROR_LEN {
        return message.to_string();
    }
    let mut cut = MAX_STORED_ERROR_LEN;
    while !message.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &message[..cut])
}
