/// In-memory JobRepository used by the integration tests
///
/// Mirrors the Diesel implementation's semantics (atomic claim, partial
/// updates, NotFound on unknown ids) and additionally records every
/// persisted progress value per job, so tests can assert ordering as
/// observed by the store.
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use yomu::modules::jobs::domain::entities::{JobRecord, JobStatus, NewJobRecord};
use yomu::modules::jobs::domain::repository::{JobChangeset, JobRepository, JobStatistics};
use yomu::shared::errors::{AppError, AppResult};

#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: Mutex<HashMap<Uuid, JobRecord>>,
    insertion_order: Mutex<Vec<Uuid>>,
    progress_history: Mutex<HashMap<Uuid, Vec<i32>>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every progress value persisted for the job, in write order
    pub fn progress_history(&self, id: Uuid) -> Vec<i32> {
        self.progress_history
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    /// Test-only direct mutation, for setting up odd states (e.g. a job
    /// that has been running for an hour)
    pub fn mutate<F: FnOnce(&mut JobRecord)>(&self, id: Uuid, f: F) {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(record) = jobs.get_mut(&id) {
            f(record);
        }
    }

    fn apply(record: &mut JobRecord, changes: JobChangeset) {
        if let Some(status) = changes.status {
            record.status = status;
        }
        if let Some(progress) = changes.progress {
            record.progress = progress;
        }
        if let Some(result) = changes.result {
            record.result = result;
        }
        if let Some(error) = changes.error {
            record.error = error;
        }
        if let Some(started_at) = changes.started_at {
            record.started_at = started_at;
        }
        if let Some(completed_at) = changes.completed_at {
            record.completed_at = completed_at;
        }
        record.updated_at = Utc::now();
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, new_job: NewJobRecord) -> AppResult<JobRecord> {
        let now = Utc::now();
        let record = JobRecord {
            id: Uuid::new_v4(),
            name: new_job.name,
            job_type: new_job.job_type,
            params: new_job.params,
            status: JobStatus::Pending,
            progress: 0,
            result: None,
            error: None,
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        self.jobs.lock().unwrap().insert(record.id, record.clone());
        self.insertion_order.lock().unwrap().push(record.id);
        Ok(record)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<JobRecord>> {
        Ok(self.jobs.lock().unwrap().get(&id).cloned())
    }

    async fn get_all(&self) -> AppResult<Vec<JobRecord>> {
        let jobs = self.jobs.lock().unwrap();
        let order = self.insertion_order.lock().unwrap();
        Ok(order
            .iter()
            .rev()
            .filter_map(|id| jobs.get(id).cloned())
            .collect())
    }

    async fn claim(&self, id: Uuid) -> AppResult<bool> {
        let mut jobs = self.jobs.lock().unwrap();
        match jobs.get_mut(&id) {
            Some(record) if record.status == JobStatus::Pending => {
                record.status = JobStatus::Running;
                record.started_at = Some(Utc::now());
                record.updated_at = Utc::now();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }

    async fn update(&self, id: Uuid, changes: JobChangeset) -> AppResult<()> {
        if let Some(progress) = changes.progress {
            self.progress_history
                .lock()
                .unwrap()
                .entry(id)
                .or_default()
                .push(progress);
        }

        let mut jobs = self.jobs.lock().unwrap();
        let record = jobs
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", id)))?;
        Self::apply(record, changes);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let removed = self.jobs.lock().unwrap().remove(&id);
        if removed.is_none() {
            return Err(AppError::NotFound(format!("Job {} not found", id)));
        }
        self.insertion_order.lock().unwrap().retain(|j| *j != id);
        Ok(())
    }

    async fn delete_by_status(&self, status: JobStatus) -> AppResult<usize> {
        let mut jobs = self.jobs.lock().unwrap();
        let doomed: Vec<Uuid> = jobs
            .values()
            .filter(|j| j.status == status)
            .map(|j| j.id)
            .collect();
        for id in &doomed {
            jobs.remove(id);
        }
        self.insertion_order
            .lock()
            .unwrap()
            .retain(|id| !doomed.contains(id));
        Ok(doomed.len())
    }

    async fn find_stale_running(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<JobRecord>> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .values()
            .filter(|j| {
                j.status == JobStatus::Running
                    && j.started_at.map(|t| t < cutoff).unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn find_stale_pending(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<JobRecord>> {
        let jobs = self.jobs.lock().unwrap();
        let order = self.insertion_order.lock().unwrap();
        Ok(order
            .iter()
            .filter_map(|id| jobs.get(id))
            .filter(|j| j.status == JobStatus::Pending && j.created_at < cutoff)
            .cloned()
            .collect())
    }

    async fn get_statistics(&self) -> AppResult<JobStatistics> {
        let jobs = self.jobs.lock().unwrap();
        let mut stats = JobStatistics::default();
        for job in jobs.values() {
            stats.total_count += 1;
            match job.status {
                JobStatus::Pending => stats.pending_count += 1,
                JobStatus::Running => stats.running_count += 1,
                JobStatus::Completed => stats.completed_count += 1,
                JobStatus::Failed => stats.failed_count += 1,
                JobStatus::Cancelled => stats.cancelled_count += 1,
            }
        }
        Ok(stats)
    }
}
