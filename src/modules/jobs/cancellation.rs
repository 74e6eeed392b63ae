/// Per-job cancellation tokens
///
/// The worker registers a token when a job starts running; the service
/// triggers it on a cancel request. Cancellation stays cooperative: handlers
/// observe the token between progress steps, nothing is interrupted.
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct CancellationRegistry {
    tokens: DashMap<Uuid, CancellationToken>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self {
            tokens: DashMap::new(),
        }
    }

    /// Create and register a token for a job about to run
    pub fn register(&self, job_id: Uuid) -> CancellationToken {
        let token = CancellationToken::new();
        self.tokens.insert(job_id, token.clone());
        token
    }

    /// Fire the token if the job is currently registered
    pub fn cancel(&self, job_id: Uuid) {
        if let Some(token) = self.tokens.get(&job_id) {
            token.cancel();
        }
    }

    /// Drop the token once the job reached a terminal state
    pub fn remove(&self, job_id: Uuid) {
        self.tokens.remove(&job_id);
    }

    pub fn is_registered(&self, job_id: Uuid) -> bool {
        self.tokens.contains_key(&job_id)
    }
}
