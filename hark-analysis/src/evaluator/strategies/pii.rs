//! PII exposure detection.

use hark_core::errors::EvaluationError;
use hark_core::types::{EntityCategory, Rule, RuleKind, RuleLogic};

use crate::evaluator::decision::partition_entities;
use crate::evaluator::strategies::{mismatch, RuleStrategy};
use crate::evaluator::{Decision, EvaluationContext};
use crate::pii_patterns::PiiPatternSet;

/// `pii_detection`: a spoken-number pattern in the raw transcript (SSN,
/// card, account number, phone) is a violation. Email addresses surface
/// through extraction but do not fire this rule. The pattern scan is
/// authoritative; the extracted PII bucket supplies evidence and quality.
pub struct PiiDetectionStrategy {
    patterns: PiiPatternSet,
    evidence_threshold: f64,
    review_threshold: f64,
}

impl PiiDetectionStrategy {
    pub fn new(evidence_threshold: f64, review_threshold: f64) -> Result<Self, EvaluationError> {
        Ok(Self {
            patterns: PiiPatternSet::new()?,
            evidence_threshold,
            review_threshold,
        })
    }
}

impl RuleStrategy for PiiDetectionStrategy {
    fn kind(&self) -> RuleKind {
        RuleKind::PiiDetection
    }

    fn evaluate(
        &self,
        rule: &Rule,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Decision, EvaluationError> {
        if !matches!(rule.logic, RuleLogic::PiiDetection) {
            return Err(mismatch(self.kind(), rule.logic.kind()));
        }

        let violation = match self.patterns.first_numeric_kind(ctx.transcript) {
            Some(kind) => {
                tracing::debug!(rule_id = %rule.rule_id, kind, "pii pattern matched");
                true
            }
            None => false,
        };
        let evidence = partition_entities(
            ctx.entities,
            &[EntityCategory::Pii],
            self.evidence_threshold,
            self.review_threshold,
        );
        Ok(Decision::with_evidence(violation, evidence))
    }
}
