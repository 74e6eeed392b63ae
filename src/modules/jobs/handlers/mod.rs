/// Task handlers
///
/// One handler per job type, registered once at startup. A handler performs
/// the actual work and either returns a result payload or fails; persisting
/// status transitions is the worker's job alone.
pub mod deduplicate;
pub mod fetch_metadata;
pub mod prepare_assets;
pub mod scan;
pub mod thumbnail;

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::log_warn;
use crate::modules::jobs::domain::entities::{ComicJobParams, JobType};
use crate::modules::jobs::domain::repository::{JobChangeset, JobRepository};
use crate::shared::errors::{AppError, AppResult};

pub use deduplicate::DeduplicateHandler;
pub use fetch_metadata::FetchMetadataHandler;
pub use prepare_assets::PrepareAssetsHandler;
pub use scan::ScanHandler;
pub use thumbnail::ThumbnailHandler;

/// Business logic for one job type
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// Run the job. Progress goes through `ctx.progress`; cancellation is
    /// observed via `ctx` between progress steps. Returns the result payload
    /// stored on completion.
    async fn execute(&self, ctx: &JobContext) -> AppResult<JsonValue>;
}

/// Everything a handler may touch while running
pub struct JobContext {
    pub job_id: Uuid,
    pub params: JsonValue,
    pub progress: ProgressReporter,
    cancellation: CancellationToken,
}

impl JobContext {
    pub fn new(
        job_id: Uuid,
        params: JsonValue,
        progress: ProgressReporter,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            job_id,
            params,
            progress,
            cancellation,
        }
    }

    /// Parse comic-scoped params; a malformed payload is a handler-fatal error
    pub fn comic_params(&self) -> AppResult<ComicJobParams> {
        serde_json::from_value(self.params.clone())
            .map_err(|e| AppError::InvalidInput(format!("Invalid job params: {}", e)))
    }

    /// Cooperative cancellation check; handlers poll this between steps
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// Persists progress for one job
///
/// Each report is written to the store before the call returns, so readers
/// never observe updates out of order. Values are clamped to 0..=100 and
/// regressions are dropped, keeping observed progress monotone.
#[derive(Clone)]
pub struct ProgressReporter {
    job_id: Uuid,
    repository: Arc<dyn JobRepository>,
    last_reported: Arc<AtomicI32>,
}

impl ProgressReporter {
    pub fn new(job_id: Uuid, repository: Arc<dyn JobRepository>) -> Self {
        Self {
            job_id,
            repository,
            last_reported: Arc::new(AtomicI32::new(-1)),
        }
    }

    pub async fn report(&self, percent: u32) {
        let percent = percent.min(100) as i32;
        if percent <= self.last_reported.load(Ordering::SeqCst) {
            return;
        }
        self.last_reported.store(percent, Ordering::SeqCst);

        if let Err(e) = self
            .repository
            .update(self.job_id, JobChangeset::progress(percent))
            .await
        {
            log_warn!(
                "Failed to persist progress {}% for job {}: {}",
                percent,
                self.job_id,
                e
            );
        }
    }

    pub fn last_reported(&self) -> i32 {
        self.last_reported.load(Ordering::SeqCst)
    }
}

/// Handler registry, resolved once at startup
///
/// Types without an entry are acknowledged by the worker as no-op successes.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<JobType, Arc<dyn JobHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(mut self, job_type: JobType, handler: Arc<dyn JobHandler>) -> Self {
        self.handlers.insert(job_type, handler);
        self
    }

    pub fn resolve(&self, job_type: JobType) -> Option<Arc<dyn JobHandler>> {
        self.handlers.get(&job_type).cloned()
    }

    pub fn registered_types(&self) -> Vec<JobType> {
        self.handlers.keys().copied().collect()
    }
}
