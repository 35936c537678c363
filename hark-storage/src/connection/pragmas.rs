//! Connection pragmas, applied once per connection at open time.

use hark_core::errors::StorageError;
use rusqlite::Connection;

/// Pragmas for write-capable connections: WAL journaling, relaxed fsync,
/// enforced foreign keys, and a busy timeout so concurrent opens back off
/// instead of failing with SQLITE_BUSY.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;
         PRAGMA cache_size = -8000;",
    )
    .map_err(|e| StorageError::SqliteError {
        message: format!("apply pragmas: {e}"),
    })
}

/// Pragmas for pooled read connections. query_only makes accidental writes
/// through the pool a hard error.
pub fn apply_read_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA query_only = ON;
         PRAGMA busy_timeout = 5000;
         PRAGMA cache_size = -8000;",
    )
    .map_err(|e| StorageError::SqliteError {
        message: format!("apply read pragmas: {e}"),
    })
}
