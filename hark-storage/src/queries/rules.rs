//! Queries for the rules table, the stored rule catalog.

use hark_core::errors::StorageError;
use hark_core::types::RuleDef;
use rusqlite::{params, Connection, OptionalExtension, Row};

// ─── Row Types ───────────────────────────────────────────────────────

/// A stored rule definition. logic_json is compiled to a typed rule by
/// the catalog loader; rows that fail to compile are skipped there.
#[derive(Debug, Clone)]
pub struct RuleRow {
    pub rule_id: String,
    pub category: String,
    pub severity: String,
    pub active: bool,
    pub description: String,
    pub logic_json: String,
    pub updated_at: i64,
}

impl RuleRow {
    /// Build a row from a raw catalog definition.
    pub fn from_def(def: &RuleDef, updated_at: i64) -> Result<Self, StorageError> {
        let logic_json =
            serde_json::to_string(&def.logic).map_err(|e| StorageError::SqliteError {
                message: format!("serialize logic for {}: {e}", def.rule_id),
            })?;
        Ok(Self {
            rule_id: def.rule_id.clone(),
            category: def.category.clone(),
            severity: def.severity.clone(),
            active: def.active,
            description: def.description.clone(),
            logic_json,
            updated_at,
        })
    }

    /// Rebuild the raw definition this row stores.
    pub fn to_def(&self) -> Result<RuleDef, StorageError> {
        let logic =
            serde_json::from_str(&self.logic_json).map_err(|e| StorageError::SqliteError {
                message: format!("parse logic for {}: {e}", self.rule_id),
            })?;
        Ok(RuleDef {
            rule_id: self.rule_id.clone(),
            category: self.category.clone(),
            severity: self.severity.clone(),
            active: self.active,
            description: self.description.clone(),
            logic,
        })
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<RuleRow> {
    Ok(RuleRow {
        rule_id: row.get(0)?,
        category: row.get(1)?,
        severity: row.get(2)?,
        active: row.get::<_, i32>(3)? != 0,
        description: row.get(4)?,
        logic_json: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

// ─── Rules ───────────────────────────────────────────────────────────

pub fn upsert_rule(conn: &Connection, r: &RuleRow) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR REPLACE INTO rules (rule_id, category, severity, active, description, logic_json, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            r.rule_id,
            r.category,
            r.severity,
            r.active as i32,
            r.description,
            r.logic_json,
            r.updated_at
        ],
    )
    .map_err(|e| StorageError::SqliteError {
        message: e.to_string(),
    })?;
    Ok(())
}

/// Active rules in stable rule_id order; the order evaluation runs in.
pub fn query_active_rules(conn: &Connection) -> Result<Vec<RuleRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT rule_id, category, severity, active, description, logic_json, updated_at
             FROM rules WHERE active = 1 ORDER BY rule_id",
        )
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;

    let rows = stmt
        .query_map([], map_row)
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}

pub fn query_all_rules(conn: &Connection) -> Result<Vec<RuleRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT rule_id, category, severity, active, description, logic_json, updated_at
             FROM rules ORDER BY rule_id",
        )
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;

    let rows = stmt
        .query_map([], map_row)
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}

pub fn get_rule(conn: &Connection, rule_id: &str) -> Result<Option<RuleRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT rule_id, category, severity, active, description, logic_json, updated_at
             FROM rules WHERE rule_id = ?1",
        )
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;

    stmt.query_row(params![rule_id], map_row)
        .optional()
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}

/// Flip a rule's active flag. Returns false when the rule does not exist.
pub fn set_rule_active(
    conn: &Connection,
    rule_id: &str,
    active: bool,
    updated_at: i64,
) -> Result<bool, StorageError> {
    let changed = conn
        .execute(
            "UPDATE rules SET active = ?2, updated_at = ?3 WHERE rule_id = ?1",
            params![rule_id, active as i32, updated_at],
        )
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
    Ok(changed > 0)
}

pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM rules", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}
