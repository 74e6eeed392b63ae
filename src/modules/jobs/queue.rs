/// In-process job queue
///
/// Transports job references (id, type, params) from the service to the
/// worker pool. FIFO, unbounded, safe for concurrent producers and competing
/// consumers. Durability lives in the record store: pending rows are
/// re-enqueued on startup and by the reconciler, so a dropped reference is
/// never a lost job.
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::modules::jobs::domain::entities::JobRef;
use crate::shared::errors::{AppError, AppResult};

pub struct JobQueue {
    tx: UnboundedSender<JobRef>,
    rx: Mutex<UnboundedReceiver<JobRef>>,
    shutdown: CancellationToken,
    depth: AtomicUsize,
}

impl JobQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
            shutdown: CancellationToken::new(),
            depth: AtomicUsize::new(0),
        }
    }

    /// Enqueue a job reference. Never blocks; fails only once shutdown has
    /// begun, in which case the pending record stays recoverable in the
    /// store.
    pub fn enqueue(&self, job_ref: JobRef) -> AppResult<()> {
        if self.shutdown.is_cancelled() {
            return Err(AppError::InternalError(
                "Job queue is shutting down".to_string(),
            ));
        }
        self.tx
            .send(job_ref)
            .map_err(|_| AppError::InternalError("Job queue is closed".to_string()))?;
        self.depth.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Wait for the next job reference. Returns None once shutdown is
    /// requested; references already handed out stay with their worker.
    pub async fn dequeue(&self) -> Option<JobRef> {
        let mut rx = self.rx.lock().await;
        let item = tokio::select! {
            _ = self.shutdown.cancelled() => None,
            item = rx.recv() => item,
        };
        if item.is_some() {
            self.depth.fetch_sub(1, Ordering::SeqCst);
        }
        item
    }

    /// Stop accepting new dequeues. In-flight jobs run to completion.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Buffered (not yet dequeued) references
    pub fn len(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}
