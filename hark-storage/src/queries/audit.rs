//! Queries for the audit tables: entity_artifacts, evaluation_history.

use hark_core::errors::StorageError;
use rusqlite::{params, Connection, OptionalExtension, Row};

// ─── Row Types ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ArtifactRow {
    pub artifact_key: String,
    pub call_id: Option<String>,
    pub payload_json: String,
    pub created_at: i64,
}

#[derive(Debug, Clone)]
pub struct EvaluationRunRow {
    pub id: i64,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub call_id: Option<String>,
    pub rules_evaluated: Option<i64>,
    pub violation_count: Option<i64>,
    pub skipped_count: Option<i64>,
    pub duration_ms: Option<i64>,
    pub status: String,
    pub error: Option<String>,
}

fn map_artifact_row(row: &Row<'_>) -> rusqlite::Result<ArtifactRow> {
    Ok(ArtifactRow {
        artifact_key: row.get(0)?,
        call_id: row.get(1)?,
        payload_json: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn map_run_row(row: &Row<'_>) -> rusqlite::Result<EvaluationRunRow> {
    Ok(EvaluationRunRow {
        id: row.get(0)?,
        started_at: row.get(1)?,
        completed_at: row.get(2)?,
        call_id: row.get(3)?,
        rules_evaluated: row.get(4)?,
        violation_count: row.get(5)?,
        skipped_count: row.get(6)?,
        duration_ms: row.get(7)?,
        status: row.get(8)?,
        error: row.get(9)?,
    })
}

// ─── Entity Artifacts ────────────────────────────────────────────────

pub fn insert_artifact(conn: &Connection, a: &ArtifactRow) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR REPLACE INTO entity_artifacts (artifact_key, call_id, payload_json, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![a.artifact_key, a.call_id, a.payload_json, a.created_at],
    )
    .map_err(|e| StorageError::SqliteError {
        message: e.to_string(),
    })?;
    Ok(())
}

pub fn get_artifact(
    conn: &Connection,
    artifact_key: &str,
) -> Result<Option<ArtifactRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT artifact_key, call_id, payload_json, created_at
             FROM entity_artifacts WHERE artifact_key = ?1",
        )
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;

    stmt.query_row(params![artifact_key], map_artifact_row)
        .optional()
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}

pub fn query_artifacts_by_call(
    conn: &Connection,
    call_id: &str,
) -> Result<Vec<ArtifactRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT artifact_key, call_id, payload_json, created_at
             FROM entity_artifacts WHERE call_id = ?1 ORDER BY created_at",
        )
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;

    let rows = stmt
        .query_map(params![call_id], map_artifact_row)
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}

pub fn count_artifacts(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM entity_artifacts", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}

// ─── Evaluation History ──────────────────────────────────────────────

/// Insert a new run record (status = 'running'). Returns the row id.
pub fn insert_run_start(
    conn: &Connection,
    started_at: i64,
    call_id: Option<&str>,
) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO evaluation_history (started_at, call_id, status) VALUES (?1, ?2, 'running')",
        params![started_at, call_id],
    )
    .map_err(|e| StorageError::SqliteError {
        message: e.to_string(),
    })?;
    Ok(conn.last_insert_rowid())
}

/// Update a run record with completion data.
#[allow(clippy::too_many_arguments)]
pub fn update_run_complete(
    conn: &Connection,
    id: i64,
    completed_at: i64,
    rules_evaluated: i64,
    violation_count: i64,
    skipped_count: i64,
    duration_ms: i64,
    status: &str,
    error: Option<&str>,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE evaluation_history SET
            completed_at = ?1, rules_evaluated = ?2, violation_count = ?3,
            skipped_count = ?4, duration_ms = ?5, status = ?6, error = ?7
         WHERE id = ?8",
        params![
            completed_at,
            rules_evaluated,
            violation_count,
            skipped_count,
            duration_ms,
            status,
            error,
            id
        ],
    )
    .map_err(|e| StorageError::SqliteError {
        message: e.to_string(),
    })?;
    Ok(())
}

/// Query recent run records, newest first.
pub fn query_recent_runs(
    conn: &Connection,
    limit: usize,
) -> Result<Vec<EvaluationRunRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, started_at, completed_at, call_id, rules_evaluated,
                    violation_count, skipped_count, duration_ms, status, error
             FROM evaluation_history ORDER BY started_at DESC, id DESC LIMIT ?1",
        )
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;

    let rows = stmt
        .query_map(params![limit as i64], map_run_row)
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}

pub fn count_runs(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM evaluation_history", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}
