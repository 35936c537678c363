//! Strategies that judge the transcript against the reference record.

use std::sync::{Arc, OnceLock};

use hark_core::errors::EvaluationError;
use hark_core::types::{EntityCategory, ReferenceRecord, Rule, RuleKind, RuleLogic};
use regex::Regex;

use crate::evaluator::decision::partition_entities;
use crate::evaluator::strategies::{mismatch, RuleStrategy};
use crate::evaluator::{Decision, EvaluationContext};
use crate::matcher::{condition_met, PatternMatcher};
use crate::vocab;

/// Names an agent states for themselves, captured from identification
/// phrases like "this is Mike" or "my name is Sarah Johnson".
pub(crate) fn identification_names(text: &str) -> Vec<String> {
    static CUE: OnceLock<Option<Regex>> = OnceLock::new();
    let cue = CUE.get_or_init(|| {
        let source = r"\b(?:[Tt]his is|[Mm]y name is|[Ii] am|[Ii]'m)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)\b";
        match Regex::new(source) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::error!(error = %e, "identification cue pattern failed to compile");
                None
            }
        }
    });
    let Some(cue) = cue else {
        return Vec::new();
    };
    cue.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|name| name.as_str().to_string())
        .collect()
}

/// True when `stated` is one of the identities the agent may use: the full
/// agent name, the agent first name, or the registered alias.
fn name_matches(stated: &str, reference: &ReferenceRecord) -> bool {
    let stated_first = stated.split_whitespace().next().unwrap_or("");
    if stated.eq_ignore_ascii_case(&reference.agent_name)
        || stated_first.eq_ignore_ascii_case(reference.agent_first_name())
    {
        return true;
    }
    if let Some(alias) = reference.agent_alias.as_deref() {
        if stated.eq_ignore_ascii_case(alias) || stated_first.eq_ignore_ascii_case(alias) {
            return true;
        }
    }
    false
}

/// `reference_check`: a boolean account flag decides the outcome, behind an
/// optional condition gate. The `alias_usage` check compares stated names
/// instead of reading a flag.
pub struct ReferenceCheckStrategy {
    evidence_threshold: f64,
    review_threshold: f64,
}

impl ReferenceCheckStrategy {
    pub fn new(evidence_threshold: f64, review_threshold: f64) -> Self {
        Self {
            evidence_threshold,
            review_threshold,
        }
    }
}

impl RuleStrategy for ReferenceCheckStrategy {
    fn kind(&self) -> RuleKind {
        RuleKind::ReferenceCheck
    }

    fn evaluate(
        &self,
        rule: &Rule,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Decision, EvaluationError> {
        let RuleLogic::ReferenceCheck { check, condition } = &rule.logic else {
            return Err(mismatch(self.kind(), rule.logic.kind()));
        };

        if !condition_met(ctx.reference, condition) {
            return Ok(Decision::compliant());
        }

        if check == "alias_usage" {
            let stated = identification_names(ctx.transcript);
            let violation = stated
                .iter()
                .any(|name| !name_matches(name, ctx.reference));
            let evidence = partition_entities(
                ctx.entities,
                &[EntityCategory::Persons],
                self.evidence_threshold,
                self.review_threshold,
            );
            return Ok(Decision::with_evidence(violation, evidence));
        }

        match ctx.reference.flag(check) {
            Some(flagged) => Ok(Decision::certain(flagged)),
            None => {
                tracing::warn!(
                    rule_id = %rule.rule_id,
                    check = %check,
                    "unknown reference flag; treating as compliant"
                );
                Ok(Decision::compliant())
            }
        }
    }
}

/// `reference_check_conditional`: when the account condition holds, any of
/// the listed phrases in the transcript is a violation.
pub struct ConditionalReferenceStrategy {
    matcher: Arc<PatternMatcher>,
}

impl ConditionalReferenceStrategy {
    pub fn new(matcher: Arc<PatternMatcher>) -> Self {
        Self { matcher }
    }
}

impl RuleStrategy for ConditionalReferenceStrategy {
    fn kind(&self) -> RuleKind {
        RuleKind::ConditionalReference
    }

    fn evaluate(
        &self,
        rule: &Rule,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Decision, EvaluationError> {
        let RuleLogic::ConditionalReference {
            condition,
            patterns,
        } = &rule.logic
        else {
            return Err(mismatch(self.kind(), rule.logic.kind()));
        };

        if !condition_met(ctx.reference, condition) {
            return Ok(Decision::compliant());
        }
        let found = self.matcher.any_found(ctx.transcript, patterns)?;
        Ok(Decision::certain(found))
    }
}

/// `reference_validation`: every name the agent states for themselves must
/// trace back to the rostered agent name or alias.
pub struct ReferenceValidationStrategy {
    evidence_threshold: f64,
    review_threshold: f64,
}

impl ReferenceValidationStrategy {
    pub fn new(evidence_threshold: f64, review_threshold: f64) -> Self {
        Self {
            evidence_threshold,
            review_threshold,
        }
    }
}

impl RuleStrategy for ReferenceValidationStrategy {
    fn kind(&self) -> RuleKind {
        RuleKind::ReferenceValidation
    }

    fn evaluate(
        &self,
        rule: &Rule,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Decision, EvaluationError> {
        let RuleLogic::ReferenceValidation { check } = &rule.logic else {
            return Err(mismatch(self.kind(), rule.logic.kind()));
        };
        if check != "agent_name_traceable" {
            tracing::warn!(
                rule_id = %rule.rule_id,
                check = %check,
                "unknown reference validation check; treating as compliant"
            );
            return Ok(Decision::compliant());
        }

        let stated = identification_names(ctx.transcript);
        let violation = stated.iter().any(|name| !name_matches(name, ctx.reference));
        let evidence = partition_entities(
            ctx.entities,
            &[EntityCategory::Persons, EntityCategory::AgentIdentification],
            self.evidence_threshold,
            self.review_threshold,
        );
        Ok(Decision::with_evidence(violation, evidence))
    }
}

/// `reference_match`: the customer's full name must be spoken, with the
/// `voicemail` context restricting the rule to voicemail calls.
pub struct ReferenceMatchStrategy {
    evidence_threshold: f64,
    review_threshold: f64,
}

impl ReferenceMatchStrategy {
    pub fn new(evidence_threshold: f64, review_threshold: f64) -> Self {
        Self {
            evidence_threshold,
            review_threshold,
        }
    }
}

impl RuleStrategy for ReferenceMatchStrategy {
    fn kind(&self) -> RuleKind {
        RuleKind::ReferenceMatch
    }

    fn evaluate(
        &self,
        rule: &Rule,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Decision, EvaluationError> {
        let RuleLogic::ReferenceMatch { check, context } = &rule.logic else {
            return Err(mismatch(self.kind(), rule.logic.kind()));
        };
        if check != "customer_full_name" {
            tracing::warn!(
                rule_id = %rule.rule_id,
                check = %check,
                "unknown reference match check; treating as compliant"
            );
            return Ok(Decision::compliant());
        }

        if context.as_deref() == Some("voicemail") && !is_voicemail_call(ctx) {
            return Ok(Decision::compliant());
        }

        let customer = ctx.reference.customer_name.trim();
        if customer.is_empty() {
            return Ok(Decision::compliant());
        }
        let spoken = ctx
            .transcript
            .to_lowercase()
            .contains(&customer.to_lowercase());
        let evidence = partition_entities(
            ctx.entities,
            &[EntityCategory::Persons],
            self.evidence_threshold,
            self.review_threshold,
        );
        Ok(Decision::with_evidence(!spoken, evidence))
    }
}

/// A call counts as voicemail when the reference record says so or the
/// transcript itself carries voicemail indicators.
fn is_voicemail_call(ctx: &EvaluationContext<'_>) -> bool {
    ctx.reference.voicemail_context || vocab::voicemail().is_match(ctx.transcript)
}
