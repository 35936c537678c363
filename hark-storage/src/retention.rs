//! Data retention for hark.db.
//!
//! Three tiers:
//! - **Completed calls** (default 90 days): processed call records and,
//!   via the cascade, their violations.
//! - **Failed calls** (default 30 days): failed records are kept long
//!   enough to diagnose, no longer.
//! - **Audit** (default 365 days): entity artifacts and evaluation runs.
//!
//! Orphaned violations (rows whose call vanished outside the cascade) are
//! swept in the same pass.

use rusqlite::{params, Connection};
use serde::Serialize;

use hark_core::config::StorageConfig;
use hark_core::errors::StorageError;

const DAY_MS: i64 = 86_400_000;

/// Configurable retention periods.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// Days completed call records are kept (default 90).
    pub completed_days: u32,
    /// Days failed call records are kept (default 30).
    pub failed_days: u32,
    /// Days audit artifacts and run history are kept (default 365).
    pub artifact_days: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            completed_days: 90,
            failed_days: 30,
            artifact_days: 365,
        }
    }
}

impl RetentionPolicy {
    /// Build a policy from the storage config section.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            completed_days: config.effective_retention_completed_days(),
            failed_days: config.effective_retention_failed_days(),
            artifact_days: config.effective_retention_artifact_days(),
        }
    }
}

/// Report of what was cleaned.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetentionReport {
    pub total_deleted: u64,
    pub per_table: Vec<TableCleanup>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableCleanup {
    pub table: String,
    pub deleted: u64,
}

/// Apply the full retention policy.
///
/// Runs inside a single transaction for atomicity. Returns a report of
/// how many rows were deleted per table.
pub fn apply_retention(
    conn: &Connection,
    policy: &RetentionPolicy,
) -> Result<RetentionReport, StorageError> {
    let start = std::time::Instant::now();
    let mut report = RetentionReport::default();

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| StorageError::SqliteError {
            message: format!("retention begin: {e}"),
        })?;

    apply_retention_inner(&tx, policy, &mut report)?;

    tx.commit().map_err(|e| StorageError::SqliteError {
        message: e.to_string(),
    })?;

    report.duration_ms = start.elapsed().as_millis() as u64;
    report.total_deleted = report.per_table.iter().map(|t| t.deleted).sum();
    Ok(report)
}

fn apply_retention_inner(
    conn: &Connection,
    policy: &RetentionPolicy,
    report: &mut RetentionReport,
) -> Result<(), StorageError> {
    let now = crate::now_ms();
    let completed_cutoff = now - policy.completed_days as i64 * DAY_MS;
    let failed_cutoff = now - policy.failed_days as i64 * DAY_MS;
    let artifact_cutoff = now - policy.artifact_days as i64 * DAY_MS;

    cleanup_calls_by_status(conn, "completed", completed_cutoff, report)?;
    cleanup_calls_by_status(conn, "failed", failed_cutoff, report)?;
    cleanup_by_time(conn, "entity_artifacts", "created_at", artifact_cutoff, report)?;
    cleanup_by_time(conn, "evaluation_history", "started_at", artifact_cutoff, report)?;
    cleanup_orphan_violations(conn, report)?;

    Ok(())
}

/// Delete call records in `status` older than `cutoff`. Their violations
/// go with them through the cascade.
fn cleanup_calls_by_status(
    conn: &Connection,
    status: &str,
    cutoff: i64,
    report: &mut RetentionReport,
) -> Result<(), StorageError> {
    let deleted = conn
        .execute(
            "DELETE FROM call_records WHERE status = ?1 AND created_at < ?2",
            params![status, cutoff],
        )
        .map_err(|e| StorageError::SqliteError {
            message: format!("call_records ({status}): {e}"),
        })? as u64;

    if deleted > 0 {
        report.per_table.push(TableCleanup {
            table: format!("call_records ({status})"),
            deleted,
        });
    }
    Ok(())
}

/// Delete rows from `table` where `time_column` < `cutoff`.
/// Table and column names are hardcoded strings from this module.
fn cleanup_by_time(
    conn: &Connection,
    table: &str,
    time_column: &str,
    cutoff: i64,
    report: &mut RetentionReport,
) -> Result<(), StorageError> {
    let sql = format!("DELETE FROM {table} WHERE {time_column} < ?1");
    let deleted = conn
        .execute(&sql, params![cutoff])
        .map_err(|e| StorageError::SqliteError {
            message: format!("{table}: {e}"),
        })? as u64;

    if deleted > 0 {
        report.per_table.push(TableCleanup {
            table: table.to_string(),
            deleted,
        });
    }
    Ok(())
}

/// Delete violations whose call record no longer exists.
fn cleanup_orphan_violations(
    conn: &Connection,
    report: &mut RetentionReport,
) -> Result<(), StorageError> {
    let deleted = conn
        .execute(
            "DELETE FROM violations
             WHERE call_id NOT IN (SELECT call_id FROM call_records)",
            [],
        )
        .map_err(|e| StorageError::SqliteError {
            message: format!("violations (orphan): {e}"),
        })? as u64;

    if deleted > 0 {
        report.per_table.push(TableCleanup {
            table: "violations (orphan)".to_string(),
            deleted,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;
    use crate::queries::calls;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn insert_call(conn: &Connection, call_id: &str, status: &str, created_at: i64) {
        conn.execute(
            "INSERT INTO call_records (call_id, status, created_at) VALUES (?1, ?2, ?3)",
            params![call_id, status, created_at],
        )
        .unwrap();
    }

    #[test]
    fn test_old_completed_calls_are_deleted() {
        let conn = setup_db();
        let now = crate::now_ms();
        insert_call(&conn, "GEN-2024-000001", "completed", now - 100 * DAY_MS);
        insert_call(&conn, "GEN-2024-000002", "completed", now - DAY_MS);

        let report = apply_retention(&conn, &RetentionPolicy::default()).unwrap();

        assert_eq!(calls::count_calls(&conn).unwrap(), 1);
        assert!(report.total_deleted >= 1);
        assert!(calls::get_call(&conn, "GEN-2024-000002").unwrap().is_some());
    }

    #[test]
    fn test_failed_calls_expire_sooner() {
        let conn = setup_db();
        let now = crate::now_ms();
        // 45 days: inside the completed window, past the failed window.
        insert_call(&conn, "GEN-2024-000010", "completed", now - 45 * DAY_MS);
        insert_call(&conn, "GEN-2024-000011", "failed", now - 45 * DAY_MS);

        apply_retention(&conn, &RetentionPolicy::default()).unwrap();

        assert!(calls::get_call(&conn, "GEN-2024-000010").unwrap().is_some());
        assert!(calls::get_call(&conn, "GEN-2024-000011").unwrap().is_none());
    }

    #[test]
    fn test_old_artifacts_and_runs_are_deleted() {
        let conn = setup_db();
        let now = crate::now_ms();
        conn.execute(
            "INSERT INTO entity_artifacts (artifact_key, payload_json, created_at)
             VALUES ('old', '{}', ?1), ('new', '{}', ?2)",
            params![now - 400 * DAY_MS, now - DAY_MS],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO evaluation_history (started_at, status) VALUES (?1, 'completed')",
            params![now - 400 * DAY_MS],
        )
        .unwrap();

        let report = apply_retention(&conn, &RetentionPolicy::default()).unwrap();

        let artifacts: i64 = conn
            .query_row("SELECT COUNT(*) FROM entity_artifacts", [], |r| r.get(0))
            .unwrap();
        assert_eq!(artifacts, 1);
        let runs: i64 = conn
            .query_row("SELECT COUNT(*) FROM evaluation_history", [], |r| r.get(0))
            .unwrap();
        assert_eq!(runs, 0);
        assert!(report.total_deleted >= 2);
    }

    #[test]
    fn test_orphan_violations_are_swept() {
        let conn = setup_db();
        let now = crate::now_ms();
        insert_call(&conn, "GEN-2024-000020", "completed", now);
        conn.execute(
            "INSERT INTO violations (call_id, rule_code, severity, code, comment, detected_at,
                                     ai_confidence, extraction_quality, created_at)
             VALUES ('GEN-2024-000020', 'LO1001.01', 'major', 'identification', '',
                     '06/01/2024 09:30:00 AM', 1.0, 1.0, ?1)",
            params![now],
        )
        .unwrap();
        // Bypass the cascade to fabricate an orphan.
        conn.execute("PRAGMA foreign_keys = OFF", []).unwrap();
        conn.execute("DELETE FROM call_records WHERE call_id = 'GEN-2024-000020'", [])
            .unwrap();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();

        let report = apply_retention(&conn, &RetentionPolicy::default()).unwrap();

        assert_eq!(calls::count_violations(&conn).unwrap(), 0);
        assert!(report
            .per_table
            .iter()
            .any(|t| t.table == "violations (orphan)"));
    }

    #[test]
    fn test_empty_db_no_errors() {
        let conn = setup_db();
        let report = apply_retention(&conn, &RetentionPolicy::default()).unwrap();
        assert_eq!(report.total_deleted, 0);
    }
}
