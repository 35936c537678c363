//! Rule evaluation: context, decisions, strategies, and dispatch.

pub mod decision;
pub mod registry;
pub mod strategies;

use std::panic::{catch_unwind, AssertUnwindSafe};

use hark_core::config::EvaluationConfig;
use hark_core::errors::EvaluationError;
use hark_core::types::{EntityBag, ReferenceRecord, Rule};

pub use decision::{partition_entities, Decision, EntityEvidence};
pub use registry::StrategyRegistry;
pub use strategies::RuleStrategy;

/// Everything a strategy may consult for one call. Borrowed, so a single
/// extraction and resolution feeds the whole rule sweep.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub transcript: &'a str,
    pub entities: &'a EntityBag,
    pub reference: &'a ReferenceRecord,
}

/// Dispatches rules to their strategies with panic isolation.
pub struct RuleEvaluator {
    registry: StrategyRegistry,
}

impl RuleEvaluator {
    pub fn new(config: &EvaluationConfig) -> Result<Self, EvaluationError> {
        Ok(Self {
            registry: StrategyRegistry::with_all_strategies(config)?,
        })
    }

    /// Evaluates one rule. A strategy panic is converted into an error so
    /// the aggregation sweep can skip the rule and continue.
    pub fn evaluate(
        &self,
        rule: &Rule,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Decision, EvaluationError> {
        let kind = rule.logic.kind();
        let Some(strategy) = self.registry.strategy_for(kind) else {
            return Err(EvaluationError::InvalidRule {
                rule_id: rule.rule_id.clone(),
                message: format!("no strategy registered for `{kind}`"),
            });
        };
        match catch_unwind(AssertUnwindSafe(|| strategy.evaluate(rule, ctx))) {
            Ok(outcome) => outcome,
            Err(panic) => Err(EvaluationError::StrategyPanic {
                rule_id: rule.rule_id.clone(),
                message: panic_message(&panic),
            }),
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use hark_core::types::{
        EntityBag, PatternList, ReferenceRecord, Rule, RuleCategory, RuleLogic, Severity,
        TimeWindow,
    };
    use smallvec::SmallVec;

    use super::EvaluationContext;

    pub fn context<'a>(
        transcript: &'a str,
        entities: &'a EntityBag,
        reference: &'a ReferenceRecord,
    ) -> EvaluationContext<'a> {
        EvaluationContext {
            transcript,
            entities,
            reference,
        }
    }

    pub fn rule_with_logic(rule_id: &str, logic: RuleLogic) -> Rule {
        Rule {
            rule_id: rule_id.to_string(),
            category: RuleCategory::Policy,
            severity: Severity::Major,
            active: true,
            description: format!("test rule {rule_id}"),
            logic,
        }
    }

    pub fn pattern_rule(
        rule_id: &str,
        patterns: &[&str],
        required: bool,
        window: TimeWindow,
    ) -> Rule {
        let patterns: PatternList = patterns.iter().map(|p| p.to_string()).collect();
        rule_with_logic(
            rule_id,
            RuleLogic::PatternMatch {
                patterns,
                required,
                window,
                entity_types: SmallVec::new(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{context, pattern_rule, rule_with_logic};
    use super::*;
    use hark_core::types::{RuleKind, TimeWindow};

    #[test]
    fn test_evaluator_dispatches_by_kind() {
        let evaluator = RuleEvaluator::new(&EvaluationConfig::default()).unwrap();
        let bag = EntityBag::new();
        let reference = ReferenceRecord::fallback();
        let ctx = context(
            "Hello, this is John Smith from AnyCompany Servicing.",
            &bag,
            &reference,
        );

        let pattern = pattern_rule("LO1001.01", &["this is"], true, TimeWindow::FullCall);
        assert!(!evaluator.evaluate(&pattern, &ctx).unwrap().violation);

        let pii = rule_with_logic("LO1008.01", hark_core::types::RuleLogic::PiiDetection);
        assert!(!evaluator.evaluate(&pii, &ctx).unwrap().violation);
    }

    #[test]
    fn test_strategy_panic_is_contained() {
        struct PanickingStrategy;
        impl RuleStrategy for PanickingStrategy {
            fn kind(&self) -> RuleKind {
                RuleKind::ComplexValidation
            }
            fn evaluate(
                &self,
                _rule: &Rule,
                _ctx: &EvaluationContext<'_>,
            ) -> Result<Decision, EvaluationError> {
                panic!("strategy blew up");
            }
        }

        // Swap in a strategy that panics for complex_validation.
        let mut evaluator = RuleEvaluator::new(&EvaluationConfig::default()).unwrap();
        evaluator.registry.register(Box::new(PanickingStrategy));

        let bag = EntityBag::new();
        let reference = ReferenceRecord::fallback();
        let ctx = context("text", &bag, &reference);
        let rule = rule_with_logic("LO1011.01", hark_core::types::RuleLogic::ComplexValidation);
        let err = evaluator.evaluate(&rule, &ctx).unwrap_err();
        match err {
            EvaluationError::StrategyPanic { rule_id, message } => {
                assert_eq!(rule_id, "LO1011.01");
                assert!(message.contains("blew up"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
