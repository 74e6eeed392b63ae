/// Duplicate detection handler
///
/// Ensures every comic has a content hash (computing and persisting missing
/// ones), then groups ids by hash. Any group with more than one member is a
/// duplicate cluster. Hashing is allocated the 0-50% progress band; grouping
/// is cheap, so progress jumps to 100 at the end.
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::modules::comic::domain::entities::ComicPatch;
use crate::modules::comic::domain::repositories::ComicRepository;
use crate::modules::jobs::handlers::{JobContext, JobHandler};
use crate::modules::storage::domain::repositories::FileHasher;
use crate::shared::errors::AppResult;
use crate::{log_info, log_warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DuplicateGroup {
    hash: String,
    count: usize,
    ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeduplicateResult {
    total_scanned: usize,
    unique_files: usize,
    duplicate_groups: usize,
    duplicates: Vec<DuplicateGroup>,
}

pub struct DeduplicateHandler {
    comics: Arc<dyn ComicRepository>,
    hasher: Arc<dyn FileHasher>,
}

impl DeduplicateHandler {
    pub fn new(comics: Arc<dyn ComicRepository>, hasher: Arc<dyn FileHasher>) -> Self {
        Self { comics, hasher }
    }
}

#[async_trait]
impl JobHandler for DeduplicateHandler {
    async fn execute(&self, ctx: &JobContext) -> AppResult<JsonValue> {
        let comics = self.comics.find_all_simple().await?;
        let total_scanned = comics.len();

        // (id, hash) pairs; filled from stored hashes plus fresh computations
        let mut hashed: Vec<(Uuid, String)> = Vec::with_capacity(total_scanned);
        let missing: Vec<_> = comics.iter().filter(|c| c.hash.is_none()).collect();
        let missing_total = missing.len();
        log_info!(
            "Deduplicate: {} comics, {} missing a hash",
            total_scanned,
            missing_total
        );

        for comic in &comics {
            if let Some(ref hash) = comic.hash {
                hashed.push((comic.id, hash.clone()));
            }
        }

        for (index, comic) in missing.iter().enumerate() {
            if ctx.is_cancelled() {
                log_info!(
                    "Deduplicate job {} cancelled after hashing {} files",
                    ctx.job_id,
                    index
                );
                break;
            }

            match self.hasher.calculate_file_hash(&comic.file_path).await {
                Ok(hash) => {
                    self.comics
                        .update(
                            comic.id,
                            ComicPatch {
                                hash: Some(hash.clone()),
                                ..Default::default()
                            },
                        )
                        .await?;
                    hashed.push((comic.id, hash));
                }
                Err(e) => {
                    log_warn!("Failed to hash {}: {}", comic.file_path, e);
                }
            }

            let attempted = index + 1;
            ctx.progress
                .report((attempted * 50 / missing_total) as u32)
                .await;
        }

        // BTreeMap keeps group ordering stable for the result payload
        let mut groups: BTreeMap<String, Vec<Uuid>> = BTreeMap::new();
        for (id, hash) in hashed {
            groups.entry(hash).or_default().push(id);
        }

        let unique_files = groups.len();
        let duplicates: Vec<DuplicateGroup> = groups
            .into_iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(hash, ids)| DuplicateGroup {
                hash,
                count: ids.len(),
                ids,
            })
            .collect();

        log_info!(
            "Deduplicate: {} unique files, {} duplicate groups",
            unique_files,
            duplicates.len()
        );
        ctx.progress.report(100).await;

        Ok(serde_json::to_value(DeduplicateResult {
            total_scanned,
            unique_files,
            duplicate_groups: duplicates.len(),
            duplicates,
        })?)
    }
}
