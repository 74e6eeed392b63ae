use async_trait::async_trait;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::modules::comic::domain::entities::Chapter;
use crate::shared::errors::AppResult;

/// Async progress callback: (pages processed, total pages)
pub type PageProgressFn = Box<dyn Fn(u32, u32) -> BoxFuture<'static, ()> + Send + Sync>;

/// Content hashing over comic archive files
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileHasher: Send + Sync {
    /// Hash the file at `path`; fails on I/O errors
    async fn calculate_file_hash(&self, path: &str) -> AppResult<String>;
}

/// Pre-generates and caches web-friendly renditions of every page
#[async_trait]
pub trait PagePrewarmer: Send + Sync {
    /// Walk every page of every chapter, invoking `on_progress` after each
    /// page. The callback is awaited before the next page is processed.
    async fn prepare_comic_pages(
        &self,
        comic_id: Uuid,
        chapters: &[Chapter],
        file_path: &str,
        on_progress: PageProgressFn,
    ) -> AppResult<()>;
}

/// Moves a comic's original file into the blob store and removes the local copy
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComicArchiver: Send + Sync {
    async fn archive(&self, comic_id: Uuid) -> AppResult<()>;
}

/// Produces (and caches) a cover thumbnail for a comic archive
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ThumbnailGenerator: Send + Sync {
    /// Returns the encoded thumbnail bytes; generating also warms the
    /// generator's cache so readers get it for free later
    async fn generate_cover_thumbnail(&self, comic_id: Uuid, file_path: &str)
        -> AppResult<Vec<u8>>;
}
