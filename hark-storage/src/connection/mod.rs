//! Connection management: write-serialized + read-pooled.

pub mod pool;
pub mod pragmas;
pub mod writer;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use hark_core::errors::StorageError;
use rusqlite::Connection;

use self::pool::ReadPool;
use self::pragmas::apply_pragmas;
use crate::migrations;

/// Manages the single write connection and the read connection pool.
pub struct DatabaseManager {
    writer: Mutex<Connection>,
    readers: ReadPool,
    path: Option<PathBuf>,
}

impl DatabaseManager {
    /// Open a database at the given path, apply pragmas, run migrations.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Self::open_with_pool_size(path, ReadPool::default_size())
    }

    /// Open with an explicit read pool size (clamped to 1..=8).
    pub fn open_with_pool_size(path: &Path, pool_size: usize) -> Result<Self, StorageError> {
        let writer = Connection::open(path).map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
        apply_pragmas(&writer)?;
        migrations::run_migrations(&writer)?;

        let readers = ReadPool::open(path, pool_size)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let writer = Connection::open_in_memory().map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
        apply_pragmas(&writer)?;
        migrations::run_migrations(&writer)?;

        // In-memory: readers can't share the same DB, so use a minimal pool.
        // Tests read through with_writer instead.
        let readers = ReadPool::open_in_memory(1)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            path: None,
        })
    }

    /// Execute a write operation with the serialized writer connection.
    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let guard = self.writer.lock().map_err(|_| StorageError::SqliteError {
            message: "write lock poisoned".to_string(),
        })?;
        f(&guard)
    }

    /// Execute a read operation with a pooled read connection.
    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        self.readers.with_conn(f)
    }

    /// Run a WAL checkpoint (TRUNCATE mode) after a batch completes.
    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                .map_err(|e| StorageError::SqliteError {
                    message: e.to_string(),
                })
        })
    }

    /// Get the database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Open a dedicated connection for the background artifact writer.
    /// Returns a fresh connection to the same database with pragmas applied.
    /// For in-memory databases the connection is its own database (artifact
    /// writes won't be visible to the main writer; testing only).
    pub fn open_artifact_connection(&self) -> Result<Connection, StorageError> {
        let conn = match &self.path {
            Some(path) => Connection::open(path).map_err(|e| StorageError::SqliteError {
                message: format!("open artifact connection: {e}"),
            })?,
            None => Connection::open_in_memory().map_err(|e| StorageError::SqliteError {
                message: format!("open in-memory artifact connection: {e}"),
            })?,
        };
        apply_pragmas(&conn)?;
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory_runs_migrations() {
        let manager = DatabaseManager::open_in_memory().unwrap();
        let version = manager
            .with_writer(|conn| {
                conn.query_row("PRAGMA user_version", [], |r| r.get::<_, i32>(0))
                    .map_err(|e| StorageError::SqliteError {
                        message: e.to_string(),
                    })
            })
            .unwrap();
        assert_eq!(version, migrations::LATEST_VERSION);
    }

    #[test]
    fn test_checkpoint_succeeds_on_fresh_db() {
        let manager = DatabaseManager::open_in_memory().unwrap();
        manager.checkpoint().unwrap();
    }

    #[test]
    fn test_in_memory_has_no_path() {
        let manager = DatabaseManager::open_in_memory().unwrap();
        assert!(manager.path().is_none());
    }
}
