/// Thumbnail pre-warm handler
///
/// Drives the thumbnail generator across the whole library so covers are
/// cached before readers ask for them. A comic whose thumbnail cannot be
/// generated is logged and skipped.
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::modules::comic::domain::repositories::ComicRepository;
use crate::modules::jobs::handlers::{JobContext, JobHandler};
use crate::modules::storage::domain::repositories::ThumbnailGenerator;
use crate::shared::errors::AppResult;
use crate::{log_info, log_warn};

#[derive(Debug, Serialize)]
struct ThumbnailResult {
    total: usize,
    generated: usize,
}

pub struct ThumbnailHandler {
    comics: Arc<dyn ComicRepository>,
    thumbnails: Arc<dyn ThumbnailGenerator>,
}

impl ThumbnailHandler {
    pub fn new(comics: Arc<dyn ComicRepository>, thumbnails: Arc<dyn ThumbnailGenerator>) -> Self {
        Self { comics, thumbnails }
    }
}

#[async_trait]
impl JobHandler for ThumbnailHandler {
    async fn execute(&self, ctx: &JobContext) -> AppResult<JsonValue> {
        let comics = self.comics.find_all_simple().await?;
        let total = comics.len();

        if total == 0 {
            ctx.progress.report(100).await;
            return Ok(serde_json::to_value(ThumbnailResult {
                total: 0,
                generated: 0,
            })?);
        }

        let mut generated = 0usize;
        for (index, comic) in comics.iter().enumerate() {
            if ctx.is_cancelled() {
                log_info!(
                    "Thumbnail job {} cancelled after {} comics",
                    ctx.job_id,
                    index
                );
                break;
            }

            match self
                .thumbnails
                .generate_cover_thumbnail(comic.id, &comic.file_path)
                .await
            {
                Ok(bytes) => {
                    generated += 1;
                    log_info!(
                        "Warmed thumbnail for comic {} ({} bytes)",
                        comic.id,
                        bytes.len()
                    );
                }
                Err(e) => {
                    log_warn!("Failed to generate thumbnail for {}: {}", comic.id, e);
                }
            }

            let attempted = index + 1;
            ctx.progress.report((attempted * 100 / total) as u32).await;
        }

        Ok(serde_json::to_value(ThumbnailResult { total, generated })?)
    }
}
