//! V002: Call lifecycle tables.
//! call_records, violations.

pub const MIGRATION_SQL: &str = r#"
-- One row per processed call. status walks transcribing -> completed
-- or transcribing -> failed; the failed path stores the marker transcript.
CREATE TABLE IF NOT EXISTS call_records (
    call_id TEXT PRIMARY KEY,
    filename TEXT,
    jurisdiction_id TEXT,
    transcript TEXT,
    entities_json TEXT,
    status TEXT NOT NULL DEFAULT 'transcribing'
        CHECK (status IN ('transcribing', 'completed', 'failed')),
    error TEXT,
    created_at INTEGER NOT NULL,
    processed_at INTEGER
) STRICT;

CREATE INDEX IF NOT EXISTS idx_call_records_status
    ON call_records(status);
CREATE INDEX IF NOT EXISTS idx_call_records_created
    ON call_records(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_call_records_failed
    ON call_records(call_id) WHERE status = 'failed';

-- Violations detected for a call. detected_at is the formatted report
-- date; created_at is the unix-ms lifecycle column retention works on.
CREATE TABLE IF NOT EXISTS violations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    call_id TEXT NOT NULL REFERENCES call_records(call_id) ON DELETE CASCADE,
    rule_code TEXT NOT NULL,
    severity TEXT NOT NULL,
    code TEXT NOT NULL,
    comment TEXT NOT NULL DEFAULT '',
    detected_at TEXT NOT NULL,
    ai_confidence REAL NOT NULL,
    extraction_quality REAL NOT NULL,
    evidence_json TEXT NOT NULL DEFAULT '[]',
    low_confidence_json TEXT NOT NULL DEFAULT '[]',
    requires_manual_review INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_violations_call
    ON violations(call_id);
CREATE INDEX IF NOT EXISTS idx_violations_rule
    ON violations(rule_code);
CREATE INDEX IF NOT EXISTS idx_violations_review
    ON violations(call_id) WHERE requires_manual_review = 1;
"#;
