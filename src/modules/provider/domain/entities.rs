/// Metadata provider entities
use serde::{Deserialize, Serialize};

/// Best search match for a title query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectCandidate {
    pub id: i64,
    pub title: String,
}

/// Extended details for a subject
///
/// `score` is on the provider's 10-point scale; consumers rescale as needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectDetails {
    pub id: i64,
    pub title: String,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub score: Option<f32>,
    pub tags: Vec<String>,
    pub cover_url: Option<String>,
}
