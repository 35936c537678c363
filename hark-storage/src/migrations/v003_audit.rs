//! V003: Audit tables.
//! entity_artifacts, evaluation_history.

pub const MIGRATION_SQL: &str = r#"
-- Extraction audit trail: serialized entity bags written by the
-- background artifact writer. call_id is nullable for anonymous runs.
CREATE TABLE IF NOT EXISTS entity_artifacts (
    artifact_key TEXT PRIMARY KEY,
    call_id TEXT,
    payload_json TEXT NOT NULL,
    created_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_entity_artifacts_call
    ON entity_artifacts(call_id) WHERE call_id IS NOT NULL;
CREATE INDEX IF NOT EXISTS idx_entity_artifacts_created
    ON entity_artifacts(created_at);

-- Evaluation history: append-only log of pipeline runs.
CREATE TABLE IF NOT EXISTS evaluation_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at INTEGER NOT NULL,
    completed_at INTEGER,
    call_id TEXT,
    rules_evaluated INTEGER,
    violation_count INTEGER,
    skipped_count INTEGER,
    duration_ms INTEGER,
    status TEXT NOT NULL DEFAULT 'running',
    error TEXT
) STRICT;

CREATE INDEX IF NOT EXISTS idx_evaluation_history_time
    ON evaluation_history(started_at DESC);
"#;
