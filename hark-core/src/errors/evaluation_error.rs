//! Rule evaluation errors.

use super::error_code::{self, HarkErrorCode};

/// Errors that can occur while compiling or evaluating a rule.
/// The dispatcher converts every variant into a skipped rule; a single bad
/// rule never aborts the sweep over the rule set.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("Missing required logic field `{field}` for type `{kind}`")]
    MissingLogicField { kind: String, field: &'static str },

    #[error("Unknown check `{check}` for type `{kind}`")]
    UnknownCheck { kind: String, check: String },

    #[error("Invalid rule {rule_id}: {message}")]
    InvalidRule { rule_id: String, message: String },

    #[error("Invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Logic variant mismatch: strategy expects `{expected}`, rule carries `{found}`")]
    LogicMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Strategy for rule {rule_id} panicked: {message}")]
    StrategyPanic { rule_id: String, message: String },
}

impl HarkErrorCode for EvaluationError {
    fn error_code(&self) -> &'static str {
        error_code::EVALUATION_ERROR
    }
}
