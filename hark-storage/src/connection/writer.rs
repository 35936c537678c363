//! Write connection utilities: BEGIN IMMEDIATE transactions.

use hark_core::errors::StorageError;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Execute a write operation inside a BEGIN IMMEDIATE transaction.
/// This acquires the write lock at transaction start, so a multi-statement
/// write never upgrades mid-flight and trips SQLITE_BUSY.
///
/// The transaction rolls back on drop; an error from the closure therefore
/// leaves the database untouched.
pub fn with_immediate_transaction<F, T>(conn: &Connection, f: F) -> Result<T, StorageError>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, StorageError>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate).map_err(|e| {
        StorageError::SqliteError {
            message: format!("failed to begin immediate transaction: {e}"),
        }
    })?;

    let result = f(&tx)?;

    tx.commit().map_err(|e| StorageError::SqliteError {
        message: format!("failed to commit: {e}"),
    })?;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn_with_table() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT)")
            .unwrap();
        conn
    }

    #[test]
    fn test_commit_persists_all_statements() {
        let conn = conn_with_table();
        with_immediate_transaction(&conn, |tx| {
            for i in 0..3 {
                tx.execute("INSERT INTO t (v) VALUES (?1)", [format!("row-{i}")])
                    .map_err(|e| StorageError::SqliteError {
                        message: e.to_string(),
                    })?;
            }
            Ok(())
        })
        .unwrap();

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_closure_error_rolls_back() {
        let conn = conn_with_table();
        let result: Result<(), StorageError> = with_immediate_transaction(&conn, |tx| {
            tx.execute("INSERT INTO t (v) VALUES ('doomed')", [])
                .map_err(|e| StorageError::SqliteError {
                    message: e.to_string(),
                })?;
            Err(StorageError::SqliteError {
                message: "forced failure".to_string(),
            })
        });
        assert!(result.is_err());

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 0, "rolled-back insert must not persist");
    }
}
