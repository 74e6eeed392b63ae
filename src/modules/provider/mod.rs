/// External metadata provider seam
///
/// The HTTP client, rate limiting and response mapping live in the provider
/// integration layer; the job system only depends on this contract.
pub mod domain;

pub use domain::entities::{SubjectCandidate, SubjectDetails};
pub use domain::repositories::MetadataProvider;
