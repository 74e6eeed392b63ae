/// Job service façade
///
/// The only surface the rest of the application talks to: create, query,
/// cancel, retry and clean up jobs. Creation returns as soon as the record
/// is persisted and the reference enqueued; callers never block on
/// execution.
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::modules::jobs::cancellation::CancellationRegistry;
use crate::modules::jobs::domain::entities::{
    ComicJobParams, JobRecord, JobStatus, JobType, NewJobRecord,
};
use crate::modules::jobs::domain::repository::{JobChangeset, JobRepository, JobStatistics};
use crate::modules::jobs::queue::JobQueue;
use crate::shared::errors::{AppError, AppResult};
use crate::{log_info, log_warn};

const MAX_NAME_LEN: usize = 255;

/// Creation request, as received from the API layer
#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobRequest {
    pub name: String,
    pub job_type: JobType,
    pub params: Option<JsonValue>,
}

pub struct JobService {
    repository: Arc<dyn JobRepository>,
    queue: Arc<JobQueue>,
    cancellations: Arc<CancellationRegistry>,
}

impl JobService {
    pub fn new(
        repository: Arc<dyn JobRepository>,
        queue: Arc<JobQueue>,
        cancellations: Arc<CancellationRegistry>,
    ) -> Self {
        Self {
            repository,
            queue,
            cancellations,
        }
    }

    /// Validate, persist as pending and enqueue. Invalid requests are
    /// rejected before anything is written.
    pub async fn create(&self, request: CreateJobRequest) -> AppResult<JobRecord> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError(
                "Job name must not be empty".to_string(),
            ));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(AppError::ValidationError(format!(
                "Job name must be at most {} characters",
                MAX_NAME_LEN
            )));
        }

        let params = request.params.unwrap_or_else(|| serde_json::json!({}));
        if request.job_type.requires_comic() {
            serde_json::from_value::<ComicJobParams>(params.clone()).map_err(|e| {
                AppError::ValidationError(format!(
                    "Job type '{}' requires a comic_id param: {}",
                    request.job_type, e
                ))
            })?;
        }

        let record = self
            .repository
            .create(NewJobRecord {
                name: name.to_string(),
                job_type: request.job_type,
                params,
            })
            .await?;

        // An enqueue fault leaves the pending row behind; the reconciler
        // redelivers it, so creation still succeeds.
        if let Err(e) = self.queue.enqueue(record.job_ref()) {
            log_warn!("Created job {} but could not enqueue it: {}", record.id, e);
        } else {
            log_info!("Created job {} ({})", record.id, record.job_type);
        }

        Ok(record)
    }

    pub async fn find_all(&self) -> AppResult<Vec<JobRecord>> {
        self.repository.get_all().await
    }

    pub async fn find_one(&self, id: Uuid) -> AppResult<JobRecord> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", id)))
    }

    /// Request cancellation. Only effective while the job is running;
    /// anything else is a no-op returning the unchanged record. The running
    /// handler observes the token cooperatively, so progress updates it has
    /// already scheduled may still land.
    pub async fn cancel(&self, id: Uuid) -> AppResult<JobRecord> {
        let record = self.find_one(id).await?;
        if record.status != JobStatus::Running {
            return Ok(record);
        }

        self.repository
            .update(id, JobChangeset::cancelled())
            .await?;
        self.cancellations.cancel(id);
        log_info!("Cancelled job {}", id);

        self.find_one(id).await
    }

    /// Retry a failed or cancelled job: reset to pending (clearing progress,
    /// outcome and timestamps) and re-enqueue exactly once. Any other status
    /// is a no-op returning the unchanged record.
    pub async fn retry(&self, id: Uuid) -> AppResult<JobRecord> {
        let record = self.find_one(id).await?;
        if !record.status.is_retryable() {
            return Ok(record);
        }

        self.repository
            .update(id, JobChangeset::retry_reset())
            .await?;

        if let Err(e) = self.queue.enqueue(record.job_ref()) {
            log_warn!("Reset job {} but could not re-enqueue it: {}", id, e);
        } else {
            log_info!("Retrying job {}", id);
        }

        self.find_one(id).await
    }

    /// Delete a job regardless of status
    pub async fn remove(&self, id: Uuid) -> AppResult<()> {
        self.repository.delete(id).await
    }

    /// Bulk delete every completed job; other statuses are untouched
    pub async fn clear_completed(&self) -> AppResult<usize> {
        let removed = self
            .repository
            .delete_by_status(JobStatus::Completed)
            .await?;
        log_info!("Cleared {} completed jobs", removed);
        Ok(removed)
    }

    pub async fn get_stats(&self) -> AppResult<JobStatistics> {
        self.repository.get_statistics().await
    }

    /// Startup recovery: every pending row is re-enqueued so the queue
    /// matches the store after a restart. Duplicate deliveries are dropped
    /// at the worker's claim.
    pub async fn recover(&self) -> AppResult<usize> {
        let pending = self.repository.find_stale_pending(Utc::now()).await?;
        let mut recovered = 0usize;
        for job in pending {
            if self.queue.enqueue(job.job_ref()).is_ok() {
                recovered += 1;
            }
        }
        if recovered > 0 {
            log_info!("Recovered {} pending jobs into the queue", recovered);
        }
        Ok(recovered)
    }
}
