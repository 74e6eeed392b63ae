/// File and asset capability seams
///
/// Hashing, page pre-warming, archival and thumbnail generation are owned by
/// the storage/image layers; jobs drive them through these contracts.
pub mod domain;

pub use domain::repositories::{
    ComicArchiver, FileHasher, PagePrewarmer, PageProgressFn, ThumbnailGenerator,
};
