pub mod entities;
pub mod repository;

pub use entities::{ComicJobParams, JobRecord, JobRef, JobStatus, JobType, NewJobRecord};
pub use repository::{JobChangeset, JobRepository, JobStatistics};
