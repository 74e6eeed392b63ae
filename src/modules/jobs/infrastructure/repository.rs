/// Diesel-based implementation of JobRepository
///
/// Uses PostgreSQL; the pending->running claim is a single conditional
/// UPDATE, so two workers can never claim the same job.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::modules::jobs::domain::entities::{JobRecord, JobStatus, NewJobRecord};
use crate::modules::jobs::domain::repository::{JobChangeset, JobRepository, JobStatistics};
use crate::modules::jobs::infrastructure::models::{
    JobChangesetModel, JobStatusDb, LibraryJobModel, NewJobModel,
};
use crate::schema::library_jobs;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::infrastructure::database::{DbConnection, DbPool};

pub struct JobRepositoryImpl {
    pool: DbPool,
}

impl JobRepositoryImpl {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get database connection from pool
    fn get_conn(&self) -> AppResult<DbConnection> {
        self.pool
            .get()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get connection: {}", e)))
    }

    fn count_by_status(conn: &mut DbConnection, status: JobStatusDb) -> AppResult<i64> {
        library_jobs::table
            .filter(library_jobs::status.eq(status))
            .count()
            .get_result(conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to count jobs: {}", e)))
    }
}

#[async_trait]
impl JobRepository for JobRepositoryImpl {
    async fn create(&self, new_job: NewJobRecord) -> AppResult<JobRecord> {
        let model = NewJobModel {
            name: new_job.name,
            job_type: new_job.job_type.to_string(),
            params: new_job.params,
            status: JobStatusDb::Pending,
            progress: 0,
        };

        let mut conn = self.get_conn()?;

        let inserted: LibraryJobModel = diesel::insert_into(library_jobs::table)
            .values(&model)
            .get_result(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to create job: {}", e)))?;

        inserted.to_job_record()
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<JobRecord>> {
        let mut conn = self.get_conn()?;

        let job: Option<LibraryJobModel> = library_jobs::table
            .find(id)
            .select(LibraryJobModel::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get job by id: {}", e)))?;

        job.map(|j| j.to_job_record()).transpose()
    }

    async fn get_all(&self) -> AppResult<Vec<JobRecord>> {
        let mut conn = self.get_conn()?;

        let jobs: Vec<LibraryJobModel> = library_jobs::table
            .order(library_jobs::created_at.desc())
            .select(LibraryJobModel::as_select())
            .load(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to list jobs: {}", e)))?;

        jobs.into_iter().map(|j| j.to_job_record()).collect()
    }

    async fn claim(&self, id: Uuid) -> AppResult<bool> {
        let mut conn = self.get_conn()?;
        let now = Utc::now();

        let updated = diesel::update(
            library_jobs::table
                .filter(library_jobs::id.eq(id))
                .filter(library_jobs::status.eq(JobStatusDb::Pending)),
        )
        .set((
            library_jobs::status.eq(JobStatusDb::Running),
            library_jobs::started_at.eq(now),
            library_jobs::updated_at.eq(now),
        ))
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to claim job: {}", e)))?;

        Ok(updated > 0)
    }

    async fn update(&self, id: Uuid, changes: JobChangeset) -> AppResult<()> {
        let mut conn = self.get_conn()?;
        let model = JobChangesetModel::from(changes);

        let updated = diesel::update(library_jobs::table.find(id))
            .set(&model)
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to update job: {}", e)))?;

        if updated == 0 {
            return Err(AppError::NotFound(format!("Job {} not found", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        let deleted = diesel::delete(library_jobs::table.find(id))
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete job: {}", e)))?;

        if deleted == 0 {
            return Err(AppError::NotFound(format!("Job {} not found", id)));
        }
        Ok(())
    }

    async fn delete_by_status(&self, status: JobStatus) -> AppResult<usize> {
        let mut conn = self.get_conn()?;

        diesel::delete(library_jobs::table.filter(library_jobs::status.eq(JobStatusDb::from(status))))
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete jobs by status: {}", e)))
    }

    async fn find_stale_running(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<JobRecord>> {
        let mut conn = self.get_conn()?;

        let jobs: Vec<LibraryJobModel> = library_jobs::table
            .filter(library_jobs::status.eq(JobStatusDb::Running))
            .filter(library_jobs::started_at.is_not_null())
            .filter(library_jobs::started_at.lt(cutoff))
            .select(LibraryJobModel::as_select())
            .load(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to find stale jobs: {}", e)))?;

        jobs.into_iter().map(|j| j.to_job_record()).collect()
    }

    async fn find_stale_pending(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<JobRecord>> {
        let mut conn = self.get_conn()?;

        let jobs: Vec<LibraryJobModel> = library_jobs::table
            .filter(library_jobs::status.eq(JobStatusDb::Pending))
            .filter(library_jobs::created_at.lt(cutoff))
            .order(library_jobs::created_at.asc())
            .select(LibraryJobModel::as_select())
            .load(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to find pending jobs: {}", e)))?;

        jobs.into_iter().map(|j| j.to_job_record()).collect()
    }

    async fn get_statistics(&self) -> AppResult<JobStatistics> {
        let mut conn = self.get_conn()?;

        let pending = Self::count_by_status(&mut conn, JobStatusDb::Pending)?;
        let running = Self::count_by_status(&mut conn, JobStatusDb::Running)?;
        let completed = Self::count_by_status(&mut conn, JobStatusDb::Completed)?;
        let failed = Self::count_by_status(&mut conn, JobStatusDb::Failed)?;
        let cancelled = Self::count_by_status(&mut conn, JobStatusDb::Cancelled)?;

        Ok(JobStatistics {
            pending_count: pending,
            running_count: running,
            completed_count: completed,
            failed_count: failed,
            cancelled_count: cancelled,
            total_count: pending + running + completed + failed + cancelled,
        })
    }
}
