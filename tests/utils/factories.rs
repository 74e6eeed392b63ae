/// Test data factories
use chrono::Utc;
use uuid::Uuid;

use yomu::modules::comic::domain::entities::{Chapter, Comic};

pub struct ComicFactory {
    comic: Comic,
}

impl ComicFactory {
    pub fn minimal() -> Self {
        let id = Uuid::new_v4();
        Self {
            comic: Comic {
                id,
                title: "Untitled".to_string(),
                author: None,
                description: None,
                rating: None,
                tags: Vec::new(),
                cover_url: None,
                file_path: format!("/library/{}.cbz", id),
                hash: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.comic.title = title.to_string();
        self
    }

    pub fn with_file_path(mut self, path: &str) -> Self {
        self.comic.file_path = path.to_string();
        self
    }

    pub fn with_hash(mut self, hash: &str) -> Self {
        self.comic.hash = Some(hash.to_string());
        self
    }

    pub fn build(self) -> Comic {
        self.comic
    }
}

pub fn chapter(comic_id: Uuid, number: i32, page_count: i32) -> Chapter {
    Chapter {
        id: Uuid::new_v4(),
        comic_id,
        title: format!("Chapter {}", number),
        number,
        page_count,
    }
}
