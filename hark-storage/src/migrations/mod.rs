//! Versioned migrations tracked by `PRAGMA user_version`.
//!
//! Each migration runs in its own transaction; a failure stops the chain
//! and leaves user_version at the last completed migration.

pub mod v001_initial;
pub mod v002_calls;
pub mod v003_audit;

use hark_core::errors::StorageError;
use rusqlite::Connection;
use tracing::{debug, info};

/// Migrations in apply order. Versions are contiguous from 1.
const MIGRATIONS: &[(i32, &str)] = &[
    (1, v001_initial::MIGRATION_SQL),
    (2, v002_calls::MIGRATION_SQL),
    (3, v003_audit::MIGRATION_SQL),
];

/// The schema version a fully migrated database reports.
pub const LATEST_VERSION: i32 = 3;

/// Apply all pending migrations. Idempotent: a database already at the
/// latest version is left untouched.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current = user_version(conn)?;
    if current >= LATEST_VERSION {
        debug!(version = current, "schema up to date");
        return Ok(());
    }

    for (version, sql) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        apply_migration(conn, *version, sql)?;
        info!(version, "applied migration");
    }
    Ok(())
}

fn apply_migration(conn: &Connection, version: i32, sql: &str) -> Result<(), StorageError> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| StorageError::MigrationFailed {
            version,
            message: format!("begin: {e}"),
        })?;
    tx.execute_batch(sql)
        .map_err(|e| StorageError::MigrationFailed {
            version,
            message: e.to_string(),
        })?;
    tx.pragma_update(None, "user_version", version)
        .map_err(|e| StorageError::MigrationFailed {
            version,
            message: format!("set user_version: {e}"),
        })?;
    tx.commit().map_err(|e| StorageError::MigrationFailed {
        version,
        message: format!("commit: {e}"),
    })
}

fn user_version(conn: &Connection) -> Result<i32, StorageError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}
