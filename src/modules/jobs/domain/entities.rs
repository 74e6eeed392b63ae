/// Domain entities for the background job system
///
/// Jobs represent async library maintenance work (scanning, metadata fetch,
/// deduplication, asset preparation) queued by the application and processed
/// by background workers.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Job status enum matching database type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Terminal states only leave via an explicit retry
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Only failed and cancelled jobs may be retried; completed jobs may not
    pub fn is_retryable(&self) -> bool {
        matches!(self, JobStatus::Failed | JobStatus::Cancelled)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            "cancelled" => Ok(JobStatus::Cancelled),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

/// Closed set of job types known to the system
///
/// Every type is accepted at creation; the worker acknowledges types without
/// a registered handler as no-op successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Scan,
    Thumbnail,
    Backup,
    Cleanup,
    Import,
    FetchMetadata,
    Deduplicate,
    PrepareAssets,
}

impl JobType {
    /// Types whose params must name a target comic
    pub fn requires_comic(&self) -> bool {
        matches!(self, JobType::FetchMetadata | JobType::PrepareAssets)
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobType::Scan => write!(f, "scan"),
            JobType::Thumbnail => write!(f, "thumbnail"),
            JobType::Backup => write!(f, "backup"),
            JobType::Cleanup => write!(f, "cleanup"),
            JobType::Import => write!(f, "import"),
            JobType::FetchMetadata => write!(f, "fetch_metadata"),
            JobType::Deduplicate => write!(f, "deduplicate"),
            JobType::PrepareAssets => write!(f, "prepare_assets"),
        }
    }
}

impl std::str::FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scan" => Ok(JobType::Scan),
            "thumbnail" => Ok(JobType::Thumbnail),
            "backup" => Ok(JobType::Backup),
            "cleanup" => Ok(JobType::Cleanup),
            "import" => Ok(JobType::Import),
            "fetch_metadata" => Ok(JobType::FetchMetadata),
            "deduplicate" => Ok(JobType::Deduplicate),
            "prepare_assets" => Ok(JobType::PrepareAssets),
            _ => Err(format!("Invalid job type: {}", s)),
        }
    }
}

/// Params for jobs scoped to a single comic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComicJobParams {
    pub comic_id: Uuid,
}

/// New job to be persisted (before insertion)
#[derive(Debug, Clone)]
pub struct NewJobRecord {
    pub name: String,
    pub job_type: JobType,
    pub params: JsonValue,
}

/// The reference transported on the queue: enough to dispatch, nothing more.
/// Full state lives in the record store.
#[derive(Debug, Clone)]
pub struct JobRef {
    pub id: Uuid,
    pub job_type: JobType,
    pub params: JsonValue,
}

/// Job record from the store (with metadata)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub name: String,
    pub job_type: JobType,
    pub params: JsonValue,
    pub status: JobStatus,
    pub progress: i32,
    pub result: Option<JsonValue>,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    /// The queue-transported reference for this record
    pub fn job_ref(&self) -> JobRef {
        JobRef {
            id: self.id,
            job_type: self.job_type,
            params: self.params.clone(),
        }
    }

    /// Parse comic-scoped params
    pub fn comic_params(&self) -> Result<ComicJobParams, serde_json::Error> {
        serde_json::from_value(self.params.clone())
    }
}
