//! SQLite persistence for hark: a single write connection behind a mutex,
//! a round-robin read pool, versioned migrations, query modules per table
//! family, keyset pagination, retention cleanup, and a background artifact
//! writer for the extraction audit trail.

pub mod artifacts;
pub mod connection;
pub mod migrations;
pub mod pagination;
pub mod queries;
pub mod retention;

pub use artifacts::{ArtifactInsert, ArtifactWriter, ArtifactWriterStats};
pub use connection::DatabaseManager;
pub use pagination::{PaginatedResult, PaginationCursor};
pub use retention::{apply_retention, RetentionPolicy, RetentionReport};

/// Current wall-clock time as unix milliseconds. Lifecycle columns
/// (created_at, processed_at, updated_at, started_at) all store this.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
