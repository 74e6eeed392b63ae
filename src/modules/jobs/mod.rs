/// Background job system module
///
/// Provides the durable job pipeline for async library maintenance:
/// - Scanning the library for new comic archives
/// - Fetching metadata from the external catalog
/// - Duplicate detection by content hash
/// - Thumbnail pre-warming and asset preparation
///
/// Architecture:
/// - Domain: entities, state machine and the record-store trait
/// - Infrastructure: Diesel-based record store
/// - Queue: in-process FIFO transport of job references
/// - Handlers: business logic per job type, behind a startup registry
/// - Worker: consumer pool driving handlers and persisting outcomes
/// - Reconciler: staleness watchdog for stuck or dropped jobs
/// - Application: the service façade the rest of the app calls
pub mod application;
pub mod bootstrap;
pub mod cancellation;
pub mod domain;
pub mod handlers;
pub mod infrastructure;
pub mod queue;
pub mod reconciler;
pub mod worker;

// Re-exports for easy access
pub use application::service::{CreateJobRequest, JobService};
pub use bootstrap::{build_registry, JobCapabilities, JobSystem, JobsConfig};
pub use cancellation::CancellationRegistry;
pub use domain::{
    entities::{ComicJobParams, JobRecord, JobRef, JobStatus, JobType, NewJobRecord},
    repository::{JobChangeset, JobRepository, JobStatistics},
};
pub use handlers::{HandlerRegistry, JobContext, JobHandler, ProgressReporter};
pub use infrastructure::JobRepositoryImpl;
pub use queue::JobQueue;
pub use reconciler::{ReconcileOutcome, StaleJobReconciler};
pub use worker::BackgroundWorker;
