use async_trait::async_trait;
use uuid::Uuid;

use crate::modules::comic::domain::entities::{Chapter, Comic, ComicPatch, ComicSummary};
use crate::shared::errors::AppResult;

/// Repository interface for comic catalog access
/// The catalog's persistence is owned by the library module; jobs only need
/// lookups, slim listings and partial updates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComicRepository: Send + Sync {
    /// Get a comic by id, None when it does not exist
    async fn find_one(&self, id: Uuid) -> AppResult<Option<Comic>>;

    /// Apply a partial update to a comic record
    async fn update(&self, id: Uuid, patch: ComicPatch) -> AppResult<()>;

    /// List every comic as a slim (id, file_path, hash) projection
    async fn find_all_simple(&self) -> AppResult<Vec<ComicSummary>>;
}

/// Repository interface for chapter access
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChapterRepository: Send + Sync {
    /// All chapters of a comic, in reading order
    async fn find_all(&self, comic_id: Uuid) -> AppResult<Vec<Chapter>>;
}
