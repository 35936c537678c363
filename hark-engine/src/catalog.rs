//! Catalog import: TOML rule and reference files into the database.
//!
//! Import is forgiving per entry and strict per file: a file that does not
//! parse is rejected whole, while an entry that fails compilation or
//! validation is logged, counted, and skipped so one bad rule cannot block
//! a catalog rollout. All surviving entries land in a single immediate
//! transaction.

use std::path::Path;

use hark_core::errors::{ConfigError, PipelineError, StorageError};
use hark_core::types::{is_canonical_rule_id, ReferenceRecord, Rule, RuleDef};
use hark_storage::connection::writer::with_immediate_transaction;
use hark_storage::queries::{reference, rules};
use hark_storage::{now_ms, DatabaseManager};
use serde::Deserialize;
use tracing::{info, warn};

/// Top level of a rule catalog file: repeated `[[rules]]` tables.
#[derive(Debug, Deserialize)]
struct RuleCatalogFile {
    #[serde(default)]
    rules: Vec<RuleDef>,
}

/// Top level of a reference data file: repeated `[[records]]` tables.
#[derive(Debug, Deserialize)]
struct ReferenceImportFile {
    #[serde(default)]
    records: Vec<ReferenceImportDef>,
}

/// One reference entry: routing keys plus the record fields inline.
#[derive(Debug, Deserialize)]
struct ReferenceImportDef {
    call_id: String,
    #[serde(default = "default_namespace")]
    namespace: String,
    #[serde(flatten)]
    record: ReferenceRecord,
}

fn default_namespace() -> String {
    "master".to_string()
}

/// An entry the importer refused: `id` is the rule id or call id.
#[derive(Debug, Clone)]
pub struct SkippedEntry {
    pub id: String,
    pub message: String,
}

/// What one import pass did.
#[derive(Debug, Default)]
pub struct CatalogImportReport {
    pub imported: usize,
    pub skipped: Vec<SkippedEntry>,
}

/// Import rule definitions from TOML text.
///
/// Every definition is compiled before anything is written; definitions
/// that do not compile are skipped. Non-canonical rule ids import anyway
/// (historical catalogs carry a few) but are logged.
pub fn import_rules_from_str(
    db: &DatabaseManager,
    content: &str,
) -> Result<CatalogImportReport, PipelineError> {
    import_rules(db, content, "<inline>")
}

/// Import rule definitions from a TOML file on disk.
pub fn import_rules_from_file(
    db: &DatabaseManager,
    path: &Path,
) -> Result<CatalogImportReport, PipelineError> {
    let content =
        std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
    import_rules(db, &content, &path.display().to_string())
}

fn import_rules(
    db: &DatabaseManager,
    content: &str,
    origin: &str,
) -> Result<CatalogImportReport, PipelineError> {
    let file: RuleCatalogFile =
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })?;

    let mut report = CatalogImportReport::default();
    let mut accepted: Vec<RuleDef> = Vec::with_capacity(file.rules.len());

    for def in file.rules {
        let rule_id = def.rule_id.clone();
        if !is_canonical_rule_id(&rule_id) {
            warn!(rule_id = %rule_id, "rule id is not in LOxxxx.yy form, importing anyway");
        }
        // Compile check only; the stored row keeps the raw definition.
        match Rule::from_def(def.clone()) {
            Ok(_) => accepted.push(def),
            Err(e) => {
                warn!(rule_id = %rule_id, error = %e, "skipping rule that does not compile");
                report.skipped.push(SkippedEntry {
                    id: rule_id,
                    message: e.to_string(),
                });
            }
        }
    }

    if !accepted.is_empty() {
        let updated_at = now_ms();
        db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                for def in &accepted {
                    let row = rules::RuleRow::from_def(def, updated_at)?;
                    rules::upsert_rule(tx, &row)?;
                }
                Ok(())
            })
        })?;
        report.imported = accepted.len();
    }

    info!(
        imported = report.imported,
        skipped = report.skipped.len(),
        origin = %origin,
        "rule catalog import finished"
    );
    Ok(report)
}

/// Import reference records from TOML text.
///
/// Records route by `namespace` (`voicemail` or `master`, default
/// `master`); anything else is skipped. Re-imports replace.
pub fn import_references_from_str(
    db: &DatabaseManager,
    content: &str,
) -> Result<CatalogImportReport, PipelineError> {
    import_references(db, content, "<inline>")
}

/// Import reference records from a TOML file on disk.
pub fn import_references_from_file(
    db: &DatabaseManager,
    path: &Path,
) -> Result<CatalogImportReport, PipelineError> {
    let content =
        std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
    import_references(db, &content, &path.display().to_string())
}

fn import_references(
    db: &DatabaseManager,
    content: &str,
    origin: &str,
) -> Result<CatalogImportReport, PipelineError> {
    let file: ReferenceImportFile =
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })?;

    let mut report = CatalogImportReport::default();
    let mut accepted: Vec<ReferenceImportDef> = Vec::with_capacity(file.records.len());

    for def in file.records {
        match def.namespace.as_str() {
            "voicemail" | "master" => accepted.push(def),
            other => {
                warn!(call_id = %def.call_id, namespace = %other, "unknown reference namespace, skipping");
                report.skipped.push(SkippedEntry {
                    id: def.call_id,
                    message: format!("unknown namespace: {other}"),
                });
            }
        }
    }

    if !accepted.is_empty() {
        let updated_at = now_ms();
        db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                for entry in &accepted {
                    reference::upsert_reference(
                        tx,
                        &entry.namespace,
                        &entry.call_id,
                        &entry.record,
                        updated_at,
                    )?;
                }
                Ok(())
            })
        })?;
        report.imported = accepted.len();
    }

    info!(
        imported = report.imported,
        skipped = report.skipped.len(),
        origin = %origin,
        "reference import finished"
    );
    Ok(report)
}

/// Load every active rule, compiled and ordered by rule id.
///
/// Rows that no longer compile (logic written by a newer version, say) are
/// logged and dropped rather than failing the load.
pub fn load_active_rules(db: &DatabaseManager) -> Result<Vec<Rule>, StorageError> {
    let rows = db.with_reader(rules::query_active_rules)?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let rule_id = row.rule_id.clone();
        let compiled = row
            .to_def()
            .map_err(|e| e.to_string())
            .and_then(|def| Rule::from_def(def).map_err(|e| e.to_string()));
        match compiled {
            Ok(rule) => out.push(rule),
            Err(message) => {
                warn!(rule_id = %rule_id, error = %message, "stored rule no longer compiles, dropping from active set");
            }
        }
    }
    Ok(out)
}
