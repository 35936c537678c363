//! Violation aggregation: the per-call rule sweep and its rollups.

pub mod accuracy;
pub mod batch;

use chrono::{DateTime, Local};
use hark_core::types::{
    format_violation_date, EntityBag, ReferenceRecord, Rule, Severity, ViolationRecord,
};

use crate::evaluator::{EvaluationContext, RuleEvaluator};

pub use accuracy::{score_against_expected, AccuracyReport};
pub use batch::{evaluate_batch, BatchCall};

/// A rule the sweep could not evaluate, with the reason it was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRule {
    pub rule_id: String,
    pub message: String,
}

/// Severity and review rollups over one call's violations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViolationTotals {
    pub total: usize,
    pub minor: usize,
    pub major: usize,
    pub critical: usize,
    pub manual_review: usize,
}

impl ViolationTotals {
    fn add(&mut self, severity: Severity, manual_review: bool) {
        self.total += 1;
        match severity {
            Severity::Minor => self.minor += 1,
            Severity::Major => self.major += 1,
            Severity::Critical => self.critical += 1,
        }
        if manual_review {
            self.manual_review += 1;
        }
    }
}

/// Result of sweeping every active rule over one call.
#[derive(Debug, Clone, Default)]
pub struct TranscriptEvaluation {
    pub violations: Vec<ViolationRecord>,
    pub rules_evaluated: usize,
    pub skipped: Vec<SkippedRule>,
    pub totals: ViolationTotals,
}

/// Sweeps `rules` over one call and collects violation records.
///
/// Inactive rules are ignored. Rules are visited in slice order, so equal
/// inputs produce an identical record list. A rule that errors or panics is
/// logged, reported in `skipped`, and never aborts the sweep.
pub fn evaluate_transcript(
    evaluator: &RuleEvaluator,
    rules: &[Rule],
    call_id: &str,
    transcript: &str,
    entities: &EntityBag,
    reference: &ReferenceRecord,
    at: DateTime<Local>,
) -> TranscriptEvaluation {
    let ctx = EvaluationContext {
        transcript,
        entities,
        reference,
    };
    let date = format_violation_date(at);

    let mut outcome = TranscriptEvaluation::default();
    for rule in rules.iter().filter(|rule| rule.active) {
        match evaluator.evaluate(rule, &ctx) {
            Ok(decision) => {
                outcome.rules_evaluated += 1;
                if !decision.violation {
                    continue;
                }
                outcome
                    .totals
                    .add(rule.severity, decision.requires_manual_review);
                outcome.violations.push(ViolationRecord {
                    date: date.clone(),
                    severity: rule.severity,
                    code: rule.category,
                    rule_code: rule.rule_id.clone(),
                    comment: rule.description.clone(),
                    call_id: call_id.to_string(),
                    ai_confidence: decision.confidence,
                    extraction_quality: decision.quality_score,
                    evidence: decision.evidence,
                    low_confidence_entities: decision.low_confidence_entities,
                    requires_manual_review: decision.requires_manual_review,
                });
            }
            Err(e) => {
                tracing::warn!(
                    call_id,
                    rule_id = %rule.rule_id,
                    error = %e,
                    "rule skipped"
                );
                outcome.skipped.push(SkippedRule {
                    rule_id: rule.rule_id.clone(),
                    message: e.to_string(),
                });
            }
        }
    }
    tracing::debug!(
        call_id,
        evaluated = outcome.rules_evaluated,
        violations = outcome.totals.total,
        skipped = outcome.skipped.len(),
        "rule sweep finished"
    );
    outcome
}

/// Portfolio compliance rate: violations found versus an allowance of three
/// per call, floored at zero and rounded to one decimal. An empty portfolio
/// is fully compliant.
pub fn compliance_rate(call_count: usize, total_violations: usize) -> f64 {
    if call_count == 0 {
        return 100.0;
    }
    let allowance = (call_count * 3) as f64;
    let rate = ((allowance - total_violations as f64) / allowance) * 100.0;
    (rate.max(0.0) * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::test_support::{pattern_rule, rule_with_logic};
    use hark_core::config::EvaluationConfig;
    use hark_core::types::{RuleCategory, RuleLogic, TimeWindow};
    use chrono::TimeZone;

    fn evaluator() -> RuleEvaluator {
        RuleEvaluator::new(&EvaluationConfig::default()).unwrap()
    }

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
    }

    fn rules() -> Vec<Rule> {
        let mut identification = pattern_rule(
            "LO1001.01",
            &["my name is", "this is"],
            true,
            TimeWindow::FullCall,
        );
        identification.category = RuleCategory::Identification;
        identification.severity = Severity::Major;

        let mut threats = rule_with_logic(
            "LO1007.05",
            RuleLogic::Sentiment {
                check: hark_core::types::SentimentCheck::ThreateningLanguage,
            },
        );
        threats.severity = Severity::Critical;

        let mut broken = pattern_rule("LO1009.01", &["(unclosed"], true, TimeWindow::FullCall);
        broken.severity = Severity::Minor;

        let mut inactive = pattern_rule("LO1010.01", &["inactive"], true, TimeWindow::FullCall);
        inactive.active = false;

        vec![identification, threats, broken, inactive]
    }

    #[test]
    fn test_sweep_collects_violations_and_skips() {
        let outcome = evaluate_transcript(
            &evaluator(),
            &rules(),
            "GEN-2024-000001",
            "Pay now or we will garnish your wages.",
            &EntityBag::new(),
            &ReferenceRecord::fallback(),
            at(),
        );
        // Identification missing and threats present; the broken rule is
        // skipped; the inactive rule is never visited.
        assert_eq!(outcome.rules_evaluated, 2);
        assert_eq!(outcome.violations.len(), 2);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].rule_id, "LO1009.01");
        assert_eq!(outcome.totals.total, 2);
        assert_eq!(outcome.totals.major, 1);
        assert_eq!(outcome.totals.critical, 1);
        assert_eq!(outcome.totals.minor, 0);
    }

    #[test]
    fn test_violation_record_fields() {
        let outcome = evaluate_transcript(
            &evaluator(),
            &rules(),
            "GEN-2024-000001",
            "We will garnish your wages.",
            &EntityBag::new(),
            &ReferenceRecord::fallback(),
            at(),
        );
        let threat = outcome
            .violations
            .iter()
            .find(|v| v.rule_code == "LO1007.05")
            .unwrap();
        assert_eq!(threat.date, "06/01/2024 09:30:00 AM");
        assert_eq!(threat.call_id, "GEN-2024-000001");
        assert_eq!(threat.severity, Severity::Critical);
        assert_eq!(threat.code, RuleCategory::Policy);
        assert_eq!(threat.comment, "test rule LO1007.05");
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let evaluator = evaluator();
        let rules = rules();
        let bag = EntityBag::new();
        let reference = ReferenceRecord::fallback();
        let transcript = "Pay now or we will garnish your wages.";
        let first = evaluate_transcript(
            &evaluator,
            &rules,
            "GEN-2024-000001",
            transcript,
            &bag,
            &reference,
            at(),
        );
        let second = evaluate_transcript(
            &evaluator,
            &rules,
            "GEN-2024-000001",
            transcript,
            &bag,
            &reference,
            at(),
        );
        assert_eq!(first.violations, second.violations);
        assert_eq!(first.totals, second.totals);
    }

    #[test]
    fn test_compliant_call_produces_no_records() {
        let outcome = evaluate_transcript(
            &evaluator(),
            &rules()[..2],
            "GEN-2024-000002",
            "Hello, this is John Smith from AnyCompany Servicing about your account.",
            &EntityBag::new(),
            &ReferenceRecord::fallback(),
            at(),
        );
        assert!(outcome.violations.is_empty());
        assert_eq!(outcome.totals, ViolationTotals::default());
    }

    #[test]
    fn test_compliance_rate() {
        assert_eq!(compliance_rate(0, 0), 100.0);
        assert_eq!(compliance_rate(10, 0), 100.0);
        // 10 calls allow 30; 3 violations leave 90%.
        assert_eq!(compliance_rate(10, 3), 90.0);
        // More violations than the allowance floor at zero.
        assert_eq!(compliance_rate(1, 50), 0.0);
        // One decimal place.
        assert_eq!(compliance_rate(3, 1), 88.9);
    }
}
