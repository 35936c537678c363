//! V001: Initial schema.
//! rules, reference_records.

pub const MIGRATION_SQL: &str = r#"
-- Rule catalog: one row per compiled rule definition.
-- logic_json holds the raw logic definition; it is compiled to a typed
-- rule at load time, and rows that fail to compile are skipped.
CREATE TABLE IF NOT EXISTS rules (
    rule_id TEXT PRIMARY KEY,
    category TEXT NOT NULL,
    severity TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    description TEXT NOT NULL DEFAULT '',
    logic_json TEXT NOT NULL,
    updated_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_rules_active
    ON rules(rule_id) WHERE active = 1;

-- Reference records in two namespaces: voicemail entries are probed
-- before master entries during resolution.
CREATE TABLE IF NOT EXISTS reference_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    namespace TEXT NOT NULL CHECK (namespace IN ('voicemail', 'master')),
    call_id TEXT NOT NULL,
    agent_name TEXT NOT NULL DEFAULT '',
    agent_alias TEXT,
    customer_name TEXT NOT NULL DEFAULT '',
    customer_state TEXT NOT NULL DEFAULT '',
    company_name TEXT NOT NULL DEFAULT '',
    do_not_call INTEGER NOT NULL DEFAULT 0,
    attorney_retained INTEGER NOT NULL DEFAULT 0,
    bankruptcy_filed INTEGER NOT NULL DEFAULT 0,
    cease_and_desist INTEGER NOT NULL DEFAULT 0,
    cure_period_expired INTEGER NOT NULL DEFAULT 0,
    third_party_risk INTEGER NOT NULL DEFAULT 0,
    voicemail_context INTEGER NOT NULL DEFAULT 0,
    expected_violations_json TEXT NOT NULL DEFAULT '[]',
    updated_at INTEGER NOT NULL,
    UNIQUE(namespace, call_id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_reference_call
    ON reference_records(call_id);
"#;
