/// Comic bounded context, as seen by the job system
///
/// The comic catalog itself (CRUD, storage layout) lives elsewhere; this
/// module defines the entities and collaborator contracts the background
/// jobs operate through.
pub mod domain;

pub use domain::entities::{Chapter, Comic, ComicPatch, ComicSummary};
pub use domain::repositories::{ChapterRepository, ComicRepository};
pub use domain::services::{ComicImporter, DirectoryScanner};
