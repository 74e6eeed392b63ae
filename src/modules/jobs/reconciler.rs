/// Stale-job reconciliation
///
/// Periodic pass over the record store that (a) fails jobs stuck `running`
/// past the staleness deadline, leaving them retryable, and (b) re-enqueues
/// old pending rows whose queue reference was dropped (crash, restart,
/// enqueue fault). The worker's atomic claim makes duplicate deliveries
/// harmless, so re-enqueueing is always safe.
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::modules::jobs::domain::repository::{JobChangeset, JobRepository};
use crate::modules::jobs::queue::JobQueue;
use crate::shared::errors::AppResult;
use crate::{log_error, log_info, log_warn};

pub struct StaleJobReconciler {
    repository: Arc<dyn JobRepository>,
    queue: Arc<JobQueue>,
    stale_after: Duration,
    interval: Duration,
    shutdown: CancellationToken,
}

/// What one reconciliation pass did
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub stalled: usize,
    pub requeued: usize,
}

impl StaleJobReconciler {
    pub fn new(
        repository: Arc<dyn JobRepository>,
        queue: Arc<JobQueue>,
        stale_after: Duration,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            repository,
            queue,
            stale_after,
            interval,
            shutdown,
        }
    }

    /// Reconciliation loop. The first tick fires immediately, which doubles
    /// as startup recovery of rows left over from a previous run.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.interval);
        log_info!(
            "Stale-job reconciler started (stale after {:?}, every {:?})",
            self.stale_after,
            self.interval
        );

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    match self.reconcile().await {
                        Ok(outcome) if outcome.stalled > 0 || outcome.requeued > 0 => {
                            log_info!(
                                "Reconciled jobs: {} stalled, {} re-enqueued",
                                outcome.stalled,
                                outcome.requeued
                            );
                        }
                        Ok(_) => {}
                        Err(e) => log_error!("Reconciliation pass failed: {}", e),
                    }
                }
            }
        }

        log_info!("Stale-job reconciler stopped");
    }

    /// One pass; separated from the loop so tests can drive it directly
    pub async fn reconcile(&self) -> AppResult<ReconcileOutcome> {
        let cutoff = Utc::now() - chrono::Duration::seconds(self.stale_after.as_secs() as i64);
        let mut outcome = ReconcileOutcome::default();

        for job in self.repository.find_stale_running(cutoff).await? {
            log_warn!(
                "Job {} stuck running since {:?}, marking failed",
                job.id,
                job.started_at
            );
            let message = match job.started_at {
                Some(started) => format!("Stalled: running since {}", started),
                None => "Stalled: running past deadline".to_string(),
            };
            self.repository
                .update(job.id, JobChangeset::failed(&message))
                .await?;
            outcome.stalled += 1;
        }

        for job in self.repository.find_stale_pending(cutoff).await? {
            match self.queue.enqueue(job.job_ref()) {
                Ok(()) => outcome.requeued += 1,
                Err(e) => {
                    log_warn!("Could not re-enqueue pending job {}: {}", job.id, e);
                }
            }
        }

        Ok(outcome)
    }
}
