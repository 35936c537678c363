//! Violation records and their evidence entries.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::constants::VIOLATION_DATE_FORMAT;
use crate::types::entity::EntityCategory;
use crate::types::rule::{RuleCategory, Severity};

/// A consulted entity that supported a violation decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceEntry {
    pub category: EntityCategory,
    pub text: String,
    pub confidence: f64,
}

/// A consulted entity below the evidence confidence line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowConfidenceEntity {
    pub category: EntityCategory,
    pub text: String,
    pub confidence: f64,
    pub reason: String,
}

/// One detected violation, shaped for persistence and review queues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationRecord {
    /// Local date formatted `%m/%d/%Y %I:%M:%S %p`.
    pub date: String,
    pub severity: Severity,
    /// The rule category.
    pub code: RuleCategory,
    pub rule_code: String,
    pub comment: String,
    pub call_id: String,
    pub ai_confidence: f64,
    pub extraction_quality: f64,
    pub evidence: Vec<EvidenceEntry>,
    pub low_confidence_entities: Vec<LowConfidenceEntity>,
    pub requires_manual_review: bool,
}

/// Format a timestamp for the violation `date` field.
pub fn format_violation_date(at: DateTime<Local>) -> String {
    at.format(VIOLATION_DATE_FORMAT).to_string()
}
