use async_trait::async_trait;

use crate::modules::comic::domain::entities::Comic;
use crate::shared::errors::AppResult;

/// Enumerates comic archive files under the configured library roots
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryScanner: Send + Sync {
    async fn list_comic_files(&self) -> AppResult<Vec<String>>;
}

/// Imports a single comic archive into the catalog
/// Fails on unreadable or unparseable archives; callers decide whether a
/// single failure is fatal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComicImporter: Send + Sync {
    async fn import_from_path(&self, path: &str) -> AppResult<Comic>;
}
