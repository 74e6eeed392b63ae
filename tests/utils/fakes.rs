/// Handwritten fakes for the external capability seams
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use yomu::modules::comic::domain::entities::{Chapter, Comic, ComicPatch, ComicSummary};
use yomu::modules::comic::domain::repositories::{ChapterRepository, ComicRepository};
use yomu::modules::comic::domain::services::{ComicImporter, DirectoryScanner};
use yomu::modules::provider::domain::entities::{SubjectCandidate, SubjectDetails};
use yomu::modules::provider::domain::repositories::MetadataProvider;
use yomu::modules::storage::domain::repositories::{
    ComicArchiver, FileHasher, PagePrewarmer, PageProgressFn, ThumbnailGenerator,
};
use yomu::shared::errors::{AppError, AppResult};

use super::factories::ComicFactory;

// ------------------------------------------------------------------ scanning

pub struct FakeScanner {
    files: Vec<String>,
}

impl FakeScanner {
    pub fn with_files(files: &[&str]) -> Self {
        Self {
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn empty() -> Self {
        Self { files: Vec::new() }
    }
}

#[async_trait]
impl DirectoryScanner for FakeScanner {
    async fn list_comic_files(&self) -> AppResult<Vec<String>> {
        Ok(self.files.clone())
    }
}

pub struct FakeImporter {
    fail_paths: HashSet<String>,
    imported: Mutex<Vec<String>>,
}

impl FakeImporter {
    pub fn new() -> Self {
        Self {
            fail_paths: HashSet::new(),
            imported: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(paths: &[&str]) -> Self {
        Self {
            fail_paths: paths.iter().map(|p| p.to_string()).collect(),
            imported: Mutex::new(Vec::new()),
        }
    }

    pub fn imported_paths(&self) -> Vec<String> {
        self.imported.lock().unwrap().clone()
    }
}

#[async_trait]
impl ComicImporter for FakeImporter {
    async fn import_from_path(&self, path: &str) -> AppResult<Comic> {
        if self.fail_paths.contains(path) {
            return Err(AppError::InvalidInput(format!(
                "Unreadable archive: {}",
                path
            )));
        }
        self.imported.lock().unwrap().push(path.to_string());
        Ok(ComicFactory::minimal().with_file_path(path).build())
    }
}

// ------------------------------------------------------------------- catalog

#[derive(Default)]
pub struct InMemoryComicRepository {
    comics: Mutex<HashMap<Uuid, Comic>>,
    order: Mutex<Vec<Uuid>>,
    update_calls: AtomicUsize,
}

impl InMemoryComicRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, comic: Comic) {
        self.order.lock().unwrap().push(comic.id);
        self.comics.lock().unwrap().insert(comic.id, comic);
    }

    pub fn get(&self, id: Uuid) -> Option<Comic> {
        self.comics.lock().unwrap().get(&id).cloned()
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ComicRepository for InMemoryComicRepository {
    async fn find_one(&self, id: Uuid) -> AppResult<Option<Comic>> {
        Ok(self.comics.lock().unwrap().get(&id).cloned())
    }

    async fn update(&self, id: Uuid, patch: ComicPatch) -> AppResult<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut comics = self.comics.lock().unwrap();
        let comic = comics
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Comic {} not found", id)))?;

        if let Some(author) = patch.author {
            comic.author = Some(author);
        }
        if let Some(description) = patch.description {
            comic.description = Some(description);
        }
        if let Some(rating) = patch.rating {
            comic.rating = Some(rating);
        }
        if let Some(tags) = patch.tags {
            comic.tags = tags;
        }
        if let Some(cover_url) = patch.cover_url {
            comic.cover_url = Some(cover_url);
        }
        if let Some(hash) = patch.hash {
            comic.hash = Some(hash);
        }
        Ok(())
    }

    async fn find_all_simple(&self) -> AppResult<Vec<ComicSummary>> {
        let comics = self.comics.lock().unwrap();
        let order = self.order.lock().unwrap();
        Ok(order
            .iter()
            .filter_map(|id| comics.get(id))
            .map(|c| ComicSummary {
                id: c.id,
                file_path: c.file_path.clone(),
                hash: c.hash.clone(),
            })
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryChapterRepository {
    chapters: Mutex<HashMap<Uuid, Vec<Chapter>>>,
}

impl InMemoryChapterRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, comic_id: Uuid, chapters: Vec<Chapter>) {
        self.chapters.lock().unwrap().insert(comic_id, chapters);
    }
}

#[async_trait]
impl ChapterRepository for InMemoryChapterRepository {
    async fn find_all(&self, comic_id: Uuid) -> AppResult<Vec<Chapter>> {
        Ok(self
            .chapters
            .lock()
            .unwrap()
            .get(&comic_id)
            .cloned()
            .unwrap_or_default())
    }
}

// ------------------------------------------------------------------- storage

pub struct FakeHasher {
    hashes: HashMap<String, String>,
    fail_paths: HashSet<String>,
}

impl FakeHasher {
    pub fn with_hashes(pairs: &[(&str, &str)]) -> Self {
        Self {
            hashes: pairs
                .iter()
                .map(|(path, hash)| (path.to_string(), hash.to_string()))
                .collect(),
            fail_paths: HashSet::new(),
        }
    }

    pub fn failing_on(mut self, path: &str) -> Self {
        self.fail_paths.insert(path.to_string());
        self
    }
}

#[async_trait]
impl FileHasher for FakeHasher {
    async fn calculate_file_hash(&self, path: &str) -> AppResult<String> {
        if self.fail_paths.contains(path) {
            return Err(AppError::InternalError(format!("I/O error on {}", path)));
        }
        self.hashes
            .get(path)
            .cloned()
            .ok_or_else(|| AppError::InternalError(format!("No such file: {}", path)))
    }
}

pub struct FakePrewarmer {
    pages: u32,
    calls: AtomicUsize,
}

impl FakePrewarmer {
    pub fn with_pages(pages: u32) -> Self {
        Self {
            pages,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PagePrewarmer for FakePrewarmer {
    async fn prepare_comic_pages(
        &self,
        _comic_id: Uuid,
        _chapters: &[Chapter],
        _file_path: &str,
        on_progress: PageProgressFn,
    ) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for page in 1..=self.pages {
            on_progress(page, self.pages).await;
        }
        Ok(())
    }
}

pub struct FakeArchiver {
    should_fail: bool,
    calls: AtomicUsize,
}

impl FakeArchiver {
    pub fn succeeding() -> Self {
        Self {
            should_fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ComicArchiver for FakeArchiver {
    async fn archive(&self, comic_id: Uuid) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(AppError::ExternalServiceError(format!(
                "Blob store rejected upload for {}",
                comic_id
            )));
        }
        Ok(())
    }
}

pub struct FakeThumbnailGenerator {
    fail_ids: HashSet<Uuid>,
}

impl FakeThumbnailGenerator {
    pub fn new() -> Self {
        Self {
            fail_ids: HashSet::new(),
        }
    }

    pub fn failing_on(mut self, id: Uuid) -> Self {
        self.fail_ids.insert(id);
        self
    }
}

#[async_trait]
impl ThumbnailGenerator for FakeThumbnailGenerator {
    async fn generate_cover_thumbnail(
        &self,
        comic_id: Uuid,
        _file_path: &str,
    ) -> AppResult<Vec<u8>> {
        if self.fail_ids.contains(&comic_id) {
            return Err(AppError::InternalError(format!(
                "Corrupt archive for {}",
                comic_id
            )));
        }
        Ok(vec![0xFF, 0xD8, 0xFF])
    }
}

// ------------------------------------------------------------------ metadata

pub struct FakeMetadataProvider {
    candidate: Option<SubjectCandidate>,
    details: Option<SubjectDetails>,
    search_calls: AtomicUsize,
}

impl FakeMetadataProvider {
    pub fn no_match() -> Self {
        Self {
            candidate: None,
            details: None,
            search_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_subject(details: SubjectDetails) -> Self {
        Self {
            candidate: Some(SubjectCandidate {
                id: details.id,
                title: details.title.clone(),
            }),
            details: Some(details),
            search_calls: AtomicUsize::new(0),
        }
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataProvider for FakeMetadataProvider {
    async fn search_subject(&self, _title: &str) -> AppResult<Option<SubjectCandidate>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidate.clone())
    }

    async fn get_subject_details(&self, id: i64) -> AppResult<Option<SubjectDetails>> {
        Ok(self.details.clone().filter(|d| d.id == id))
    }
}
