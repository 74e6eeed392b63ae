/// Diesel models for the library_jobs table
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::modules::jobs::domain::entities::{JobRecord, JobStatus, JobType};
use crate::modules::jobs::domain::repository::JobChangeset;
use crate::schema::library_jobs;
use crate::shared::errors::AppError;

/// Job status enum matching database type
#[derive(
    diesel_derive_enum::DbEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::JobStatus"]
#[serde(rename_all = "lowercase")]
pub enum JobStatusDb {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl From<JobStatus> for JobStatusDb {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Pending => JobStatusDb::Pending,
            JobStatus::Running => JobStatusDb::Running,
            JobStatus::Completed => JobStatusDb::Completed,
            JobStatus::Failed => JobStatusDb::Failed,
            JobStatus::Cancelled => JobStatusDb::Cancelled,
        }
    }
}

impl From<JobStatusDb> for JobStatus {
    fn from(status: JobStatusDb) -> Self {
        match status {
            JobStatusDb::Pending => JobStatus::Pending,
            JobStatusDb::Running => JobStatus::Running,
            JobStatusDb::Completed => JobStatus::Completed,
            JobStatusDb::Failed => JobStatus::Failed,
            JobStatusDb::Cancelled => JobStatus::Cancelled,
        }
    }
}

/// Diesel model for inserting new jobs
#[derive(Insertable, Debug)]
#[diesel(table_name = library_jobs)]
pub struct NewJobModel {
    pub name: String,
    pub job_type: String,
    pub params: JsonValue,
    pub status: JobStatusDb,
    pub progress: i32,
}

/// Diesel model for querying existing jobs
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = library_jobs)]
pub struct LibraryJobModel {
    pub id: Uuid,
    pub name: String,
    pub job_type: String,
    pub params: JsonValue,
    pub status: JobStatusDb,
    pub progress: i32,
    pub result: Option<JsonValue>,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LibraryJobModel {
    /// Convert to domain JobRecord
    ///
    /// The stored job_type string is expected to be one of the closed set; a
    /// stray value is a data error, not a caller error.
    pub fn to_job_record(self) -> Result<JobRecord, AppError> {
        let job_type: JobType = self
            .job_type
            .parse()
            .map_err(|e: String| AppError::DatabaseError(e))?;

        Ok(JobRecord {
            id: self.id,
            name: self.name,
            job_type,
            params: self.params,
            status: self.status.into(),
            progress: self.progress,
            result: self.result,
            error: self.error,
            started_at: self.started_at,
            completed_at: self.completed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Diesel changeset mirroring the domain `JobChangeset`
///
/// Outer None skips the column; `Some(None)` writes NULL to nullable columns.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = library_jobs)]
pub struct JobChangesetModel {
    pub status: Option<JobStatusDb>,
    pub progress: Option<i32>,
    pub result: Option<Option<JsonValue>>,
    pub error: Option<Option<String>>,
    pub started_at: Option<Option<DateTime<Utc>>>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
    pub updated_at: DateTime<Utc>,
}

impl From<JobChangeset> for JobChangesetModel {
    fn from(changes: JobChangeset) -> Self {
        Self {
            status: changes.status.map(Into::into),
            progress: changes.progress,
            result: changes.result,
            error: changes.error,
            started_at: changes.started_at,
            completed_at: changes.completed_at,
            updated_at: Utc::now(),
        }
    }
}
