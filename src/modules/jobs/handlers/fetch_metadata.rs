/// Metadata fetch handler
///
/// Looks a comic up in the external catalog by title and merges the best
/// match into the record: description, author, rating (provider 10-point
/// scale halved and rounded to our 5-point scale), the first five tags and
/// the cover. No match is a successful outcome, not a failure.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::modules::comic::domain::entities::ComicPatch;
use crate::modules::comic::domain::repositories::ComicRepository;
use crate::modules::jobs::handlers::{JobContext, JobHandler};
use crate::modules::provider::domain::entities::{SubjectCandidate, SubjectDetails};
use crate::modules::provider::domain::repositories::MetadataProvider;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::infrastructure::kv_store::KeyValueStore;
use crate::{log_debug, log_info};

/// Search results are cached briefly so re-runs and retries skip the catalog
const SEARCH_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

const MAX_MERGED_TAGS: usize = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FetchMetadataResult {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject_id: Option<i64>,
}

pub struct FetchMetadataHandler {
    comics: Arc<dyn ComicRepository>,
    provider: Arc<dyn MetadataProvider>,
    cache: Arc<dyn KeyValueStore>,
}

impl FetchMetadataHandler {
    pub fn new(
        comics: Arc<dyn ComicRepository>,
        provider: Arc<dyn MetadataProvider>,
        cache: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            comics,
            provider,
            cache,
        }
    }

    async fn search_with_cache(&self, title: &str) -> AppResult<Option<SubjectCandidate>> {
        let key = format!("metadata:search:{}", title.trim().to_lowercase());

        if let Some(cached) = self.cache.get(&key).await {
            if let Ok(candidate) = serde_json::from_value::<SubjectCandidate>(cached) {
                log_debug!("Metadata search cache hit for '{}'", title);
                return Ok(Some(candidate));
            }
        }

        let candidate = self.provider.search_subject(title).await?;
        if let Some(ref found) = candidate {
            self.cache
                .set(&key, serde_json::to_value(found)?, SEARCH_CACHE_TTL)
                .await;
        }
        Ok(candidate)
    }
}

/// Build the patch applied to the comic from provider details
fn build_patch(details: &SubjectDetails) -> ComicPatch {
    ComicPatch {
        description: details.summary.clone(),
        author: details.author.clone(),
        rating: details.score.map(|score| (score / 2.0).round()),
        tags: if details.tags.is_empty() {
            None
        } else {
            Some(details.tags.iter().take(MAX_MERGED_TAGS).cloned().collect())
        },
        cover_url: details.cover_url.clone(),
        hash: None,
    }
}

#[async_trait]
impl JobHandler for FetchMetadataHandler {
    async fn execute(&self, ctx: &JobContext) -> AppResult<JsonValue> {
        let params = ctx.comic_params()?;

        let comic = self
            .comics
            .find_one(params.comic_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Comic {} not found", params.comic_id))
            })?;
        ctx.progress.report(10).await;

        let candidate = match self.search_with_cache(&comic.title).await? {
            Some(candidate) => candidate,
            None => {
                log_info!("No metadata match for '{}'", comic.title);
                ctx.progress.report(100).await;
                return Ok(serde_json::to_value(FetchMetadataResult {
                    found: false,
                    subject_id: None,
                })?);
            }
        };
        ctx.progress.report(40).await;

        let details = match self.provider.get_subject_details(candidate.id).await? {
            Some(details) => details,
            None => {
                log_info!(
                    "Subject {} vanished between search and fetch for '{}'",
                    candidate.id,
                    comic.title
                );
                ctx.progress.report(100).await;
                return Ok(serde_json::to_value(FetchMetadataResult {
                    found: false,
                    subject_id: None,
                })?);
            }
        };
        ctx.progress.report(70).await;

        let patch = build_patch(&details);
        if !patch.is_empty() {
            self.comics.update(params.comic_id, patch).await?;
        }

        log_info!(
            "Merged metadata for '{}' from subject {}",
            comic.title,
            details.id
        );
        ctx.progress.report(100).await;

        Ok(serde_json::to_value(FetchMetadataResult {
            found: true,
            subject_id: Some(details.id),
        })?)
    }
}
