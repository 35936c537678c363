//! Queries for call_records and violations, the call lifecycle tables.

use hark_core::errors::StorageError;
use hark_core::types::{RuleCategory, Severity, ViolationRecord};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::pagination::{PaginatedResult, PaginationCursor};

/// Transcript marker written on the failed path.
pub use hark_core::constants::TRANSCRIPTION_FAILED_MARKER;

// ─── Row Types ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CallRecordRow {
    pub call_id: String,
    pub filename: Option<String>,
    pub jurisdiction_id: Option<String>,
    pub transcript: Option<String>,
    pub entities_json: Option<String>,
    pub status: String,
    pub error: Option<String>,
    pub created_at: i64,
    pub processed_at: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ViolationRow {
    pub id: i64,
    pub call_id: String,
    pub rule_code: String,
    pub severity: String,
    pub code: String,
    pub comment: String,
    pub detected_at: String,
    pub ai_confidence: f64,
    pub extraction_quality: f64,
    pub evidence_json: String,
    pub low_confidence_json: String,
    pub requires_manual_review: bool,
    pub created_at: i64,
}

impl ViolationRow {
    /// Rebuild the domain record this row stores. Unknown severities or
    /// categories reject the single row.
    pub fn to_record(&self) -> Result<ViolationRecord, StorageError> {
        let severity = Severity::parse(&self.severity).ok_or_else(|| {
            StorageError::SqliteError {
                message: format!("violation {}: unknown severity `{}`", self.id, self.severity),
            }
        })?;
        let code = RuleCategory::parse(&self.code).ok_or_else(|| {
            StorageError::SqliteError {
                message: format!("violation {}: unknown category `{}`", self.id, self.code),
            }
        })?;
        let evidence =
            serde_json::from_str(&self.evidence_json).map_err(|e| StorageError::SqliteError {
                message: format!("violation {}: evidence json: {e}", self.id),
            })?;
        let low_confidence_entities = serde_json::from_str(&self.low_confidence_json)
            .map_err(|e| StorageError::SqliteError {
                message: format!("violation {}: low confidence json: {e}", self.id),
            })?;
        Ok(ViolationRecord {
            date: self.detected_at.clone(),
            severity,
            code,
            rule_code: self.rule_code.clone(),
            comment: self.comment.clone(),
            call_id: self.call_id.clone(),
            ai_confidence: self.ai_confidence,
            extraction_quality: self.extraction_quality,
            evidence,
            low_confidence_entities,
            requires_manual_review: self.requires_manual_review,
        })
    }
}

fn map_call_row(row: &Row<'_>) -> rusqlite::Result<CallRecordRow> {
    Ok(CallRecordRow {
        call_id: row.get(0)?,
        filename: row.get(1)?,
        jurisdiction_id: row.get(2)?,
        transcript: row.get(3)?,
        entities_json: row.get(4)?,
        status: row.get(5)?,
        error: row.get(6)?,
        created_at: row.get(7)?,
        processed_at: row.get(8)?,
    })
}

fn map_violation_row(row: &Row<'_>) -> rusqlite::Result<ViolationRow> {
    Ok(ViolationRow {
        id: row.get(0)?,
        call_id: row.get(1)?,
        rule_code: row.get(2)?,
        severity: row.get(3)?,
        code: row.get(4)?,
        comment: row.get(5)?,
        detected_at: row.get(6)?,
        ai_confidence: row.get(7)?,
        extraction_quality: row.get(8)?,
        evidence_json: row.get(9)?,
        low_confidence_json: row.get(10)?,
        requires_manual_review: row.get::<_, i32>(11)? != 0,
        created_at: row.get(12)?,
    })
}

// ─── Call Records ────────────────────────────────────────────────────

/// Record an incoming call in the transcribing state. Re-ingesting a
/// call_id replaces the old row; its violations cascade away with it.
pub fn insert_transcribing(
    conn: &Connection,
    call_id: &str,
    filename: Option<&str>,
    jurisdiction_id: Option<&str>,
    created_at: i64,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR REPLACE INTO call_records (call_id, filename, jurisdiction_id, status, created_at)
         VALUES (?1, ?2, ?3, 'transcribing', ?4)",
        params![call_id, filename, jurisdiction_id, created_at],
    )
    .map_err(|e| StorageError::SqliteError {
        message: e.to_string(),
    })?;
    Ok(())
}

/// Mark a call completed with its transcript and serialized entity bag.
/// Returns false when the call_id is unknown.
pub fn mark_completed(
    conn: &Connection,
    call_id: &str,
    transcript: &str,
    entities_json: &str,
    processed_at: i64,
) -> Result<bool, StorageError> {
    let changed = conn
        .execute(
            "UPDATE call_records
             SET transcript = ?2, entities_json = ?3, status = 'completed',
                 error = NULL, processed_at = ?4
             WHERE call_id = ?1",
            params![call_id, transcript, entities_json, processed_at],
        )
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
    Ok(changed > 0)
}

/// Mark a call failed: the marker transcript, the error, processed_at.
/// Returns false when the call_id is unknown.
pub fn mark_failed(
    conn: &Connection,
    call_id: &str,
    error: &str,
    processed_at: i64,
) -> Result<bool, StorageError> {
    let changed = conn
        .execute(
            "UPDATE call_records
             SET transcript = ?2, status = 'failed', error = ?3, processed_at = ?4
             WHERE call_id = ?1",
            params![call_id, TRANSCRIPTION_FAILED_MARKER, error, processed_at],
        )
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
    Ok(changed > 0)
}

pub fn get_call(conn: &Connection, call_id: &str) -> Result<Option<CallRecordRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT call_id, filename, jurisdiction_id, transcript, entities_json,
                    status, error, created_at, processed_at
             FROM call_records WHERE call_id = ?1",
        )
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;

    stmt.query_row(params![call_id], map_call_row)
        .optional()
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}

pub fn count_calls(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM call_records", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}

pub fn count_calls_by_status(conn: &Connection, status: &str) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM call_records WHERE status = ?1",
        params![status],
        |row| row.get(0),
    )
    .map_err(|e| StorageError::SqliteError {
        message: e.to_string(),
    })
}

/// List calls newest-first with keyset pagination on (created_at, call_id).
pub fn list_calls(
    conn: &Connection,
    cursor: Option<&PaginationCursor>,
    page_size: u32,
) -> Result<PaginatedResult<CallRecordRow>, StorageError> {
    let limit = page_size.max(1) as i64;
    let total = count_calls(conn)? as u64;

    let mut items: Vec<CallRecordRow> = match cursor {
        Some(c) => {
            let mut stmt = conn
                .prepare_cached(
                    "SELECT call_id, filename, jurisdiction_id, transcript, entities_json,
                            status, error, created_at, processed_at
                     FROM call_records
                     WHERE created_at < ?1 OR (created_at = ?1 AND call_id < ?2)
                     ORDER BY created_at DESC, call_id DESC
                     LIMIT ?3",
                )
                .map_err(|e| StorageError::SqliteError {
                    message: e.to_string(),
                })?;
            let rows = stmt
                .query_map(params![c.last_sort_value, c.last_id, limit + 1], map_call_row)
                .map_err(|e| StorageError::SqliteError {
                    message: e.to_string(),
                })?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| StorageError::SqliteError {
                    message: e.to_string(),
                })?
        }
        None => {
            let mut stmt = conn
                .prepare_cached(
                    "SELECT call_id, filename, jurisdiction_id, transcript, entities_json,
                            status, error, created_at, processed_at
                     FROM call_records
                     ORDER BY created_at DESC, call_id DESC
                     LIMIT ?1",
                )
                .map_err(|e| StorageError::SqliteError {
                    message: e.to_string(),
                })?;
            let rows = stmt
                .query_map(params![limit + 1], map_call_row)
                .map_err(|e| StorageError::SqliteError {
                    message: e.to_string(),
                })?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| StorageError::SqliteError {
                    message: e.to_string(),
                })?
        }
    };

    let has_more = items.len() as i64 > limit;
    if has_more {
        items.truncate(limit as usize);
    }
    let next_cursor = if has_more {
        items.last().map(|last| {
            PaginationCursor {
                last_sort_value: last.created_at,
                last_id: last.call_id.clone(),
            }
            .encode()
        })
    } else {
        None
    };

    Ok(PaginatedResult {
        items,
        total,
        has_more,
        next_cursor,
    })
}

// ─── Violations ──────────────────────────────────────────────────────

pub fn insert_violation(
    conn: &Connection,
    v: &ViolationRecord,
    created_at: i64,
) -> Result<(), StorageError> {
    let evidence_json =
        serde_json::to_string(&v.evidence).map_err(|e| StorageError::SqliteError {
            message: format!("serialize evidence for {}: {e}", v.rule_code),
        })?;
    let low_confidence_json = serde_json::to_string(&v.low_confidence_entities).map_err(|e| {
        StorageError::SqliteError {
            message: format!("serialize low-confidence entities for {}: {e}", v.rule_code),
        }
    })?;
    conn.execute(
        "INSERT INTO violations (call_id, rule_code, severity, code, comment, detected_at,
                                 ai_confidence, extraction_quality, evidence_json,
                                 low_confidence_json, requires_manual_review, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            v.call_id,
            v.rule_code,
            v.severity.as_str(),
            v.code.as_str(),
            v.comment,
            v.date,
            v.ai_confidence,
            v.extraction_quality,
            evidence_json,
            low_confidence_json,
            v.requires_manual_review as i32,
            created_at
        ],
    )
    .map_err(|e| StorageError::SqliteError {
        message: e.to_string(),
    })?;
    Ok(())
}

pub fn insert_violations(
    conn: &Connection,
    violations: &[ViolationRecord],
    created_at: i64,
) -> Result<(), StorageError> {
    for v in violations {
        insert_violation(conn, v, created_at)?;
    }
    Ok(())
}

pub fn query_violations_by_call(
    conn: &Connection,
    call_id: &str,
) -> Result<Vec<ViolationRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, call_id, rule_code, severity, code, comment, detected_at,
                    ai_confidence, extraction_quality, evidence_json, low_confidence_json,
                    requires_manual_review, created_at
             FROM violations WHERE call_id = ?1 ORDER BY id",
        )
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;

    let rows = stmt
        .query_map(params![call_id], map_violation_row)
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}

pub fn count_violations(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM violations", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}
