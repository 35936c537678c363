//! One strategy per rule logic kind.
//!
//! Strategies are pure: transcript, entity bag, and reference record in,
//! decision out. Each strategy double-checks the logic variant it receives
//! and reports a mismatch instead of panicking, so a registry wiring bug
//! surfaces as a skipped rule.

mod pattern_rules;
mod pii;
mod reference_rules;
mod sentiment;
mod system;

use hark_core::errors::EvaluationError;
use hark_core::types::{Rule, RuleKind};

use super::{Decision, EvaluationContext};

pub use pattern_rules::{ConditionalPatternStrategy, FallbackStrategy, PatternMatchStrategy};
pub use pii::PiiDetectionStrategy;
pub use reference_rules::{
    ConditionalReferenceStrategy, ReferenceCheckStrategy, ReferenceMatchStrategy,
    ReferenceValidationStrategy,
};
pub use sentiment::SentimentStrategy;
pub use system::{ComplexValidationStrategy, SystemCheckStrategy};

/// Evaluates rules of a single logic kind.
pub trait RuleStrategy: Send + Sync {
    fn kind(&self) -> RuleKind;

    fn evaluate(
        &self,
        rule: &Rule,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Decision, EvaluationError>;
}

/// Error for a rule whose logic variant does not match its strategy.
pub(crate) fn mismatch(expected: RuleKind, found: RuleKind) -> EvaluationError {
    EvaluationError::LogicMismatch {
        expected: expected.as_str(),
        found: found.as_str(),
    }
}
