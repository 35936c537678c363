//! System checks and complex validations.
//!
//! Both run against systems of record this engine does not integrate with,
//! so they resolve compliant and leave an audit trail in the logs. The
//! check-name table is kept so an unknown name is visible instead of
//! silently passing.

use hark_core::errors::EvaluationError;
use hark_core::types::{Rule, RuleKind, RuleLogic};

use crate::evaluator::strategies::{mismatch, RuleStrategy};
use crate::evaluator::{Decision, EvaluationContext};

const KNOWN_SYSTEM_CHECKS: &[&str] = &["documentation_complete", "activity_code_accuracy"];

/// `system_check`: back-office record checks.
pub struct SystemCheckStrategy;

impl RuleStrategy for SystemCheckStrategy {
    fn kind(&self) -> RuleKind {
        RuleKind::SystemCheck
    }

    fn evaluate(
        &self,
        rule: &Rule,
        _ctx: &EvaluationContext<'_>,
    ) -> Result<Decision, EvaluationError> {
        let RuleLogic::SystemCheck { check } = &rule.logic else {
            return Err(mismatch(self.kind(), rule.logic.kind()));
        };
        if !KNOWN_SYSTEM_CHECKS.contains(&check.as_str()) {
            tracing::warn!(
                rule_id = %rule.rule_id,
                check = %check,
                "unknown system check; treating as compliant"
            );
        }
        Ok(Decision::compliant())
    }
}

/// `complex_validation`: multi-source validations outside transcript scope.
pub struct ComplexValidationStrategy;

impl RuleStrategy for ComplexValidationStrategy {
    fn kind(&self) -> RuleKind {
        RuleKind::ComplexValidation
    }

    fn evaluate(
        &self,
        rule: &Rule,
        _ctx: &EvaluationContext<'_>,
    ) -> Result<Decision, EvaluationError> {
        if !matches!(rule.logic, RuleLogic::ComplexValidation) {
            return Err(mismatch(self.kind(), rule.logic.kind()));
        }
        Ok(Decision::compliant())
    }
}
