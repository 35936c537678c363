//! Pattern-driven strategies: plain, conditional, and fallback.

use std::sync::Arc;

use hark_core::errors::EvaluationError;
use hark_core::types::{Rule, RuleKind, RuleLogic};

use crate::evaluator::decision::partition_entities;
use crate::evaluator::strategies::{mismatch, RuleStrategy};
use crate::evaluator::{Decision, EvaluationContext};
use crate::matcher::{condition_met, windowed, PatternMatcher};

/// `pattern_match`: a required phrase must appear in the rule's window, or a
/// prohibited phrase must not.
pub struct PatternMatchStrategy {
    matcher: Arc<PatternMatcher>,
    opening_words: usize,
    evidence_threshold: f64,
    review_threshold: f64,
}

impl PatternMatchStrategy {
    pub fn new(
        matcher: Arc<PatternMatcher>,
        opening_words: usize,
        evidence_threshold: f64,
        review_threshold: f64,
    ) -> Self {
        Self {
            matcher,
            opening_words,
            evidence_threshold,
            review_threshold,
        }
    }
}

impl RuleStrategy for PatternMatchStrategy {
    fn kind(&self) -> RuleKind {
        RuleKind::PatternMatch
    }

    fn evaluate(
        &self,
        rule: &Rule,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Decision, EvaluationError> {
        let RuleLogic::PatternMatch {
            patterns,
            required,
            window,
            entity_types,
        } = &rule.logic
        else {
            return Err(mismatch(self.kind(), rule.logic.kind()));
        };

        let text = windowed(ctx.transcript, *window, self.opening_words);
        let found = self.matcher.any_found(&text, patterns)?;
        let violation = (*required && !found) || (!*required && found);
        let evidence = partition_entities(
            ctx.entities,
            entity_types,
            self.evidence_threshold,
            self.review_threshold,
        );
        Ok(Decision::with_evidence(violation, evidence))
    }
}

/// `pattern_match_conditional`: pattern logic that only applies when the
/// reference condition holds. The gate closing means compliant, full stop.
pub struct ConditionalPatternStrategy {
    matcher: Arc<PatternMatcher>,
}

impl ConditionalPatternStrategy {
    pub fn new(matcher: Arc<PatternMatcher>) -> Self {
        Self { matcher }
    }
}

impl RuleStrategy for ConditionalPatternStrategy {
    fn kind(&self) -> RuleKind {
        RuleKind::ConditionalPattern
    }

    fn evaluate(
        &self,
        rule: &Rule,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Decision, EvaluationError> {
        let RuleLogic::ConditionalPattern {
            condition,
            patterns,
            required,
        } = &rule.logic
        else {
            return Err(mismatch(self.kind(), rule.logic.kind()));
        };

        if !condition_met(ctx.reference, condition) {
            return Ok(Decision::compliant());
        }
        let found = self.matcher.any_found(ctx.transcript, patterns)?;
        let violation = (*required && !found) || (!*required && found);
        Ok(Decision::certain(violation))
    }
}

/// Unrecognized logic types evaluate with plain pattern semantics over the
/// full transcript, so a catalog ahead of this binary degrades predictably.
pub struct FallbackStrategy {
    matcher: Arc<PatternMatcher>,
}

impl FallbackStrategy {
    pub fn new(matcher: Arc<PatternMatcher>) -> Self {
        Self { matcher }
    }
}

impl RuleStrategy for FallbackStrategy {
    fn kind(&self) -> RuleKind {
        RuleKind::Fallback
    }

    fn evaluate(
        &self,
        rule: &Rule,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Decision, EvaluationError> {
        let RuleLogic::Fallback {
            raw_type,
            patterns,
            required,
        } = &rule.logic
        else {
            return Err(mismatch(self.kind(), rule.logic.kind()));
        };

        tracing::debug!(
            rule_id = %rule.rule_id,
            logic_type = %raw_type,
            "unrecognized logic type evaluated with pattern semantics"
        );
        let found = self.matcher.any_found(ctx.transcript, patterns)?;
        let violation = (*required && !found) || (!*required && found);
        Ok(Decision::certain(violation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::test_support::{context, pattern_rule, rule_with_logic};
    use hark_core::types::{
        ConditionValue, Entity, EntityBag, EntityCategory, ReferenceRecord, TimeWindow,
    };
    use rustc_hash::FxHashMap;
    use smallvec::smallvec;

    fn strategy() -> PatternMatchStrategy {
        PatternMatchStrategy::new(Arc::new(PatternMatcher::new(64)), 150, 0.8, 0.8)
    }

    #[test]
    fn test_required_pattern_missing_is_a_violation() {
        let rule = pattern_rule(
            "LO1001.01",
            &["my name is", "this is"],
            true,
            TimeWindow::FullCall,
        );
        let bag = EntityBag::new();
        let reference = ReferenceRecord::fallback();
        let ctx = context("We need your payment today.", &bag, &reference);
        let decision = strategy().evaluate(&rule, &ctx).unwrap();
        assert!(decision.violation);
    }

    #[test]
    fn test_required_pattern_present_is_compliant() {
        let rule = pattern_rule(
            "LO1001.01",
            &["my name is", "this is"],
            true,
            TimeWindow::FullCall,
        );
        let bag = EntityBag::new();
        let reference = ReferenceRecord::fallback();
        let ctx = context(
            "Hello, this is John Smith from AnyCompany Servicing.",
            &bag,
            &reference,
        );
        let decision = strategy().evaluate(&rule, &ctx).unwrap();
        assert!(!decision.violation);
    }

    #[test]
    fn test_prohibited_pattern_present_is_a_violation() {
        let rule = pattern_rule("LO1009.02", &["warrant"], false, TimeWindow::FullCall);
        let bag = EntityBag::new();
        let reference = ReferenceRecord::fallback();
        let ctx = context("A warrant will be issued for your arrest.", &bag, &reference);
        assert!(strategy().evaluate(&rule, &ctx).unwrap().violation);

        let ctx = context("Please call us back at your convenience.", &bag, &reference);
        assert!(!strategy().evaluate(&rule, &ctx).unwrap().violation);
    }

    #[test]
    fn test_opening_window_excludes_late_text() {
        let rule = pattern_rule(
            "LO1001.01",
            &["this is"],
            true,
            TimeWindow::FirstSixtySeconds,
        );
        // Identification arrives past the 150-word opening window.
        let mut transcript = "filler ".repeat(160);
        transcript.push_str("this is John Smith.");
        let bag = EntityBag::new();
        let reference = ReferenceRecord::fallback();
        let ctx = context(&transcript, &bag, &reference);
        assert!(strategy().evaluate(&rule, &ctx).unwrap().violation);

        // The same phrase inside the window passes.
        let transcript = format!("this is John Smith. {}", "filler ".repeat(160));
        let ctx = context(&transcript, &bag, &reference);
        assert!(!strategy().evaluate(&rule, &ctx).unwrap().violation);
    }

    #[test]
    fn test_entity_evidence_is_attached() {
        let mut rule = pattern_rule("LO1001.01", &["this is"], true, TimeWindow::FullCall);
        if let RuleLogic::PatternMatch { entity_types, .. } = &mut rule.logic {
            *entity_types = smallvec![EntityCategory::Persons];
        }
        let mut bag = EntityBag::new();
        bag.push(EntityCategory::Persons, Entity::new("John Smith", 0.92));
        bag.push(EntityCategory::Persons, Entity::new("Mike", 0.75));
        let reference = ReferenceRecord::fallback();
        let ctx = context("No identification happened here.", &bag, &reference);
        let decision = strategy().evaluate(&rule, &ctx).unwrap();
        assert!(decision.violation);
        assert_eq!(decision.evidence.len(), 1);
        assert_eq!(decision.low_confidence_entities.len(), 1);
        assert!(decision.requires_manual_review);
        assert!((decision.quality_score - (0.92 + 0.75) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_pattern_surfaces_as_error() {
        let rule = pattern_rule("LO1001.01", &["(unclosed"], true, TimeWindow::FullCall);
        let bag = EntityBag::new();
        let reference = ReferenceRecord::fallback();
        let ctx = context("anything", &bag, &reference);
        assert!(matches!(
            strategy().evaluate(&rule, &ctx),
            Err(EvaluationError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_conditional_pattern_gate() {
        let matcher = Arc::new(PatternMatcher::new(64));
        let strategy = ConditionalPatternStrategy::new(matcher);

        let mut condition = FxHashMap::default();
        condition.insert("attorney_retained".to_string(), ConditionValue::Bool(true));
        let rule = rule_with_logic(
            "LO1005.02",
            RuleLogic::ConditionalPattern {
                condition,
                patterns: ["contact your attorney".to_string()].into_iter().collect(),
                required: true,
            },
        );

        let bag = EntityBag::new();
        let transcript = "We will need a payment today.";

        // Gate closed: compliant even though the pattern is absent.
        let reference = ReferenceRecord::fallback();
        let ctx = context(transcript, &bag, &reference);
        assert!(!strategy.evaluate(&rule, &ctx).unwrap().violation);

        // Gate open and required pattern absent: violation.
        let mut retained = ReferenceRecord::fallback();
        retained.attorney_retained = true;
        let ctx = context(transcript, &bag, &retained);
        assert!(strategy.evaluate(&rule, &ctx).unwrap().violation);

        // Gate open and pattern present: compliant.
        let ctx = context(
            "Per policy we can only contact your attorney going forward.",
            &bag,
            &retained,
        );
        assert!(!strategy.evaluate(&rule, &ctx).unwrap().violation);
    }

    #[test]
    fn test_fallback_uses_pattern_semantics() {
        let strategy = FallbackStrategy::new(Arc::new(PatternMatcher::new(64)));
        let rule = rule_with_logic(
            "LO1042.01",
            RuleLogic::Fallback {
                raw_type: "ml_scoring".to_string(),
                patterns: ["settlement offer".to_string()].into_iter().collect(),
                required: false,
            },
        );
        let bag = EntityBag::new();
        let reference = ReferenceRecord::fallback();
        let ctx = context("This settlement offer expires today.", &bag, &reference);
        assert!(strategy.evaluate(&rule, &ctx).unwrap().violation);
    }

    #[test]
    fn test_wrong_logic_variant_is_a_mismatch() {
        let rule = rule_with_logic("LO1042.01", RuleLogic::ComplexValidation);
        let bag = EntityBag::new();
        let reference = ReferenceRecord::fallback();
        let ctx = context("text", &bag, &reference);
        assert!(matches!(
            strategy().evaluate(&rule, &ctx),
            Err(EvaluationError::LogicMismatch { .. })
        ));
    }
}
