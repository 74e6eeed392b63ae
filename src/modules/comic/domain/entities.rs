/// Comic domain entities
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comic {
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    /// Reader rating on a 5-point scale
    pub rating: Option<f32>,
    pub tags: Vec<String>,
    pub cover_url: Option<String>,
    pub file_path: String,
    /// Content hash of the source file, if computed
    pub hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: Uuid,
    pub comic_id: Uuid,
    pub title: String,
    pub number: i32,
    pub page_count: i32,
}

/// Slim projection used by library-wide maintenance passes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComicSummary {
    pub id: Uuid,
    pub file_path: String,
    pub hash: Option<String>,
}

/// Partial update applied to a comic record; `None` fields are untouched
#[derive(Debug, Clone, Default)]
pub struct ComicPatch {
    pub author: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f32>,
    pub tags: Option<Vec<String>>,
    pub cover_url: Option<String>,
    pub hash: Option<String>,
}

impl ComicPatch {
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.description.is_none()
            && self.rating.is_none()
            && self.tags.is_none()
            && self.cover_url.is_none()
            && self.hash.is_none()
    }
}
