// Shared Kernel - Domain Driven Design
// Following Clean Architecture + Hexagonal Architecture patterns

pub mod errors; // Shared error types
pub mod infrastructure; // Shared infrastructure (database, key-value store)
pub mod utils; // Shared utilities (logging)

// Re-exports for convenience
pub use infrastructure::database::Database;
pub use infrastructure::kv_store::{InMemoryKvStore, KeyValueStore};
