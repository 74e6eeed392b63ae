use async_trait::async_trait;

use crate::modules::provider::domain::entities::{SubjectCandidate, SubjectDetails};
use crate::shared::errors::AppResult;

/// Contract for fetching comic metadata from an external catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search the catalog by title; returns the top match, None when the
    /// catalog has nothing resembling the title
    async fn search_subject(&self, title: &str) -> AppResult<Option<SubjectCandidate>>;

    /// Fetch extended details for a subject id; None when the subject
    /// disappeared between search and fetch
    async fn get_subject_details(&self, id: i64) -> AppResult<Option<SubjectDetails>>;
}
