pub mod service;

pub use service::{CreateJobRequest, JobService};
