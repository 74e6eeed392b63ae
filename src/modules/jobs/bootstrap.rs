/// Job system wiring
///
/// Builds the handler registry, queue, service, worker pool and reconciler
/// as one unit. The record store and the external capabilities are injected;
/// everything else is owned here.
use std::env;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::modules::comic::domain::repositories::{ChapterRepository, ComicRepository};
use crate::modules::comic::domain::services::{ComicImporter, DirectoryScanner};
use crate::modules::jobs::application::service::JobService;
use crate::modules::jobs::cancellation::CancellationRegistry;
use crate::modules::jobs::domain::entities::JobType;
use crate::modules::jobs::domain::repository::JobRepository;
use crate::modules::jobs::handlers::{
    DeduplicateHandler, FetchMetadataHandler, HandlerRegistry, PrepareAssetsHandler, ScanHandler,
    ThumbnailHandler,
};
use crate::modules::jobs::queue::JobQueue;
use crate::modules::jobs::reconciler::StaleJobReconciler;
use crate::modules::jobs::worker::BackgroundWorker;
use crate::modules::provider::domain::repositories::MetadataProvider;
use crate::modules::storage::domain::repositories::{
    ComicArchiver, FileHasher, PagePrewarmer, ThumbnailGenerator,
};
use crate::shared::infrastructure::kv_store::KeyValueStore;

/// Tunables for the worker pool and reconciler
#[derive(Debug, Clone)]
pub struct JobsConfig {
    pub worker_count: usize,
    pub stale_after: Duration,
    pub reconcile_interval: Duration,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            worker_count: 2,
            stale_after: Duration::from_secs(30 * 60),
            reconcile_interval: Duration::from_secs(5 * 60),
        }
    }
}

impl JobsConfig {
    /// Read overrides from the environment, falling back to defaults
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Self {
            worker_count: env_parse("JOB_WORKER_COUNT", defaults.worker_count),
            stale_after: Duration::from_secs(env_parse(
                "JOB_STALE_AFTER_SECS",
                defaults.stale_after.as_secs(),
            )),
            reconcile_interval: Duration::from_secs(env_parse(
                "JOB_RECONCILE_INTERVAL_SECS",
                defaults.reconcile_interval.as_secs(),
            )),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// External capabilities the handlers drive
pub struct JobCapabilities {
    pub scanner: Arc<dyn DirectoryScanner>,
    pub importer: Arc<dyn ComicImporter>,
    pub comics: Arc<dyn ComicRepository>,
    pub chapters: Arc<dyn ChapterRepository>,
    pub hasher: Arc<dyn FileHasher>,
    pub metadata: Arc<dyn MetadataProvider>,
    pub metadata_cache: Arc<dyn KeyValueStore>,
    pub prewarmer: Arc<dyn PagePrewarmer>,
    pub archiver: Arc<dyn ComicArchiver>,
    pub thumbnails: Arc<dyn ThumbnailGenerator>,
}

/// Map every handled job type to its handler, once
pub fn build_registry(caps: &JobCapabilities) -> HandlerRegistry {
    HandlerRegistry::new()
        .register(
            JobType::Scan,
            Arc::new(ScanHandler::new(
                Arc::clone(&caps.scanner),
                Arc::clone(&caps.importer),
            )),
        )
        .register(
            JobType::FetchMetadata,
            Arc::new(FetchMetadataHandler::new(
                Arc::clone(&caps.comics),
                Arc::clone(&caps.metadata),
                Arc::clone(&caps.metadata_cache),
            )),
        )
        .register(
            JobType::Deduplicate,
            Arc::new(DeduplicateHandler::new(
                Arc::clone(&caps.comics),
                Arc::clone(&caps.hasher),
            )),
        )
        .register(
            JobType::Thumbnail,
            Arc::new(ThumbnailHandler::new(
                Arc::clone(&caps.comics),
                Arc::clone(&caps.thumbnails),
            )),
        )
        .register(
            JobType::PrepareAssets,
            Arc::new(PrepareAssetsHandler::new(
                Arc::clone(&caps.comics),
                Arc::clone(&caps.chapters),
                Arc::clone(&caps.prewarmer),
                Arc::clone(&caps.archiver),
            )),
        )
}

/// A running job system: service handle plus background tasks
pub struct JobSystem {
    pub service: Arc<JobService>,
    queue: Arc<JobQueue>,
    shutdown: CancellationToken,
    worker_handles: Vec<JoinHandle<()>>,
    reconciler_handle: JoinHandle<()>,
}

impl JobSystem {
    /// Wire and start the system. Must run inside a tokio runtime.
    pub fn start(
        config: JobsConfig,
        repository: Arc<dyn JobRepository>,
        capabilities: JobCapabilities,
    ) -> Self {
        let queue = Arc::new(JobQueue::new());
        let cancellations = Arc::new(CancellationRegistry::new());
        let registry = Arc::new(build_registry(&capabilities));

        let service = Arc::new(JobService::new(
            Arc::clone(&repository),
            Arc::clone(&queue),
            Arc::clone(&cancellations),
        ));

        let worker = Arc::new(BackgroundWorker::new(
            Arc::clone(&queue),
            Arc::clone(&repository),
            registry,
            cancellations,
        ));

        let worker_handles = (0..config.worker_count.max(1))
            .map(|_| tokio::spawn(Arc::clone(&worker).run()))
            .collect();

        let shutdown = CancellationToken::new();
        let reconciler = Arc::new(StaleJobReconciler::new(
            repository,
            Arc::clone(&queue),
            config.stale_after,
            config.reconcile_interval,
            shutdown.clone(),
        ));
        let reconciler_handle = tokio::spawn(reconciler.run());

        Self {
            service,
            queue,
            shutdown,
            worker_handles,
            reconciler_handle,
        }
    }

    /// Graceful shutdown: stop dequeues, stop the reconciler, wait for
    /// in-flight jobs to finish.
    pub async fn shutdown(self) {
        self.queue.shutdown();
        self.shutdown.cancel();

        for handle in self.worker_handles {
            let _ = handle.await;
        }
        let _ = self.reconciler_handle.await;
    }
}
