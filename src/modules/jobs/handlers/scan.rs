/// Library scan handler
///
/// Enumerates candidate archive files and imports each into the catalog.
/// A file that fails to import is logged and skipped; only infrastructure
/// failures (the listing itself) fail the job.
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::modules::comic::domain::services::{ComicImporter, DirectoryScanner};
use crate::modules::jobs::handlers::{JobContext, JobHandler};
use crate::shared::errors::AppResult;
use crate::{log_info, log_warn};

#[derive(Debug, Serialize)]
struct ScanResult {
    total: usize,
    processed: usize,
}

pub struct ScanHandler {
    scanner: Arc<dyn DirectoryScanner>,
    importer: Arc<dyn ComicImporter>,
}

impl ScanHandler {
    pub fn new(scanner: Arc<dyn DirectoryScanner>, importer: Arc<dyn ComicImporter>) -> Self {
        Self { scanner, importer }
    }
}

#[async_trait]
impl JobHandler for ScanHandler {
    async fn execute(&self, ctx: &JobContext) -> AppResult<JsonValue> {
        let files = self.scanner.list_comic_files().await?;
        let total = files.len();
        log_info!("Scan found {} candidate files", total);

        if total == 0 {
            ctx.progress.report(100).await;
            return Ok(serde_json::to_value(ScanResult {
                total: 0,
                processed: 0,
            })?);
        }

        let mut processed = 0usize;
        for (index, path) in files.iter().enumerate() {
            if ctx.is_cancelled() {
                log_info!("Scan job {} cancelled after {} files", ctx.job_id, index);
                break;
            }

            match self.importer.import_from_path(path).await {
                Ok(comic) => {
                    processed += 1;
                    log_info!("Imported '{}' from {}", comic.title, path);
                }
                Err(e) => {
                    log_warn!("Skipping {}: {}", path, e);
                }
            }

            let attempted = index + 1;
            ctx.progress.report((attempted * 100 / total) as u32).await;
        }

        Ok(serde_json::to_value(ScanResult { total, processed })?)
    }
}
