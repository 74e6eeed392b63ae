/// Background worker for the job queue
///
/// One or more identical consumer loops pull references off the queue,
/// claim the record, dispatch to the registered handler and persist the
/// outcome. A failing handler never takes the loop down.
use std::sync::Arc;

use crate::modules::jobs::cancellation::CancellationRegistry;
use crate::modules::jobs::domain::entities::{JobRef, JobStatus};
use crate::modules::jobs::domain::repository::{JobChangeset, JobRepository};
use crate::modules::jobs::handlers::{HandlerRegistry, JobContext, ProgressReporter};
use crate::modules::jobs::queue::JobQueue;
use crate::shared::errors::AppResult;
use crate::{log_debug, log_error, log_info, log_warn};

pub struct BackgroundWorker {
    queue: Arc<JobQueue>,
    repository: Arc<dyn JobRepository>,
    registry: Arc<HandlerRegistry>,
    cancellations: Arc<CancellationRegistry>,
}

impl BackgroundWorker {
    pub fn new(
        queue: Arc<JobQueue>,
        repository: Arc<dyn JobRepository>,
        registry: Arc<HandlerRegistry>,
        cancellations: Arc<CancellationRegistry>,
    ) -> Self {
        Self {
            queue,
            repository,
            registry,
            cancellations,
        }
    }

    /// Consumer loop. Run with tokio::spawn; several loops may share one
    /// worker instance, the queue hands every reference to exactly one.
    pub async fn run(self: Arc<Self>) {
        log_info!("Background worker started");

        while let Some(job_ref) = self.queue.dequeue().await {
            let job_id = job_ref.id;
            if let Err(e) = self.process_job(job_ref).await {
                // The job stays in its pre-fault status and remains
                // recoverable via retry or reconciliation.
                log_error!("Error processing job {}: {}", job_id, e);
            }
        }

        log_info!("Background worker stopped");
    }

    async fn process_job(&self, job_ref: JobRef) -> AppResult<()> {
        // Atomic pending->running; a redelivered or already-handled
        // reference fails the claim and is dropped here.
        if !self.repository.claim(job_ref.id).await? {
            log_debug!("Job {} is no longer pending, skipping", job_ref.id);
            return Ok(());
        }

        log_info!("Processing job {} (type: {})", job_ref.id, job_ref.job_type);

        let handler = match self.registry.resolve(job_ref.job_type) {
            Some(handler) => handler,
            None => {
                // Valid type with no registered handler: acknowledge as a
                // no-op success rather than retrying forever.
                log_warn!(
                    "No handler registered for job type '{}', acknowledging job {}",
                    job_ref.job_type,
                    job_ref.id
                );
                self.repository
                    .update(
                        job_ref.id,
                        JobChangeset::completed(serde_json::Value::Null),
                    )
                    .await?;
                return Ok(());
            }
        };

        let token = self.cancellations.register(job_ref.id);
        let reporter = ProgressReporter::new(job_ref.id, Arc::clone(&self.repository));
        let ctx = JobContext::new(job_ref.id, job_ref.params, reporter, token);

        let outcome = handler.execute(&ctx).await;
        self.cancellations.remove(job_ref.id);

        // A cancel observed mid-flight already wrote the terminal state;
        // the handler's outcome must not overwrite it.
        if let Some(record) = self.repository.get_by_id(job_ref.id).await? {
            if record.status == JobStatus::Cancelled {
                log_info!("Job {} was cancelled during execution", job_ref.id);
                return Ok(());
            }
        }

        match outcome {
            Ok(result) => {
                self.repository
                    .update(job_ref.id, JobChangeset::completed(result))
                    .await?;
                log_info!("Job {} completed successfully", job_ref.id);
            }
            Err(e) => {
                let message = e.to_string();
                log_warn!("Job {} failed: {}", job_ref.id, message);
                self.repository
                    .update(job_ref.id, JobChangeset::failed(&message))
                    .await?;
            }
        }

        Ok(())
    }
}
