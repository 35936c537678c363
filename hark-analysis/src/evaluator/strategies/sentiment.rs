//! Vocabulary-backed sentiment checks.

use hark_core::errors::EvaluationError;
use hark_core::types::{EntityCategory, Rule, RuleKind, RuleLogic, SentimentCheck};

use crate::evaluator::decision::partition_entities;
use crate::evaluator::strategies::{mismatch, RuleStrategy};
use crate::evaluator::{Decision, EvaluationContext};
use crate::vocab::{self, VocabularyMatcher};

/// `sentiment_analysis`: scans the full transcript with the fixed vocabulary
/// for the named check. The vocabulary scan is authoritative; extracted
/// entities only annotate the decision.
pub struct SentimentStrategy {
    evidence_threshold: f64,
    review_threshold: f64,
}

impl SentimentStrategy {
    pub fn new(evidence_threshold: f64, review_threshold: f64) -> Self {
        Self {
            evidence_threshold,
            review_threshold,
        }
    }
}

fn vocabulary_for(check: SentimentCheck) -> &'static VocabularyMatcher {
    match check {
        SentimentCheck::Profanity => vocab::profanity(),
        SentimentCheck::ThreateningLanguage => vocab::threatening(),
        SentimentCheck::FraudulentRepresentation => vocab::fraud(),
    }
}

/// Only the threatening check has a matching entity bucket to consult.
fn consulted_categories(check: SentimentCheck) -> &'static [EntityCategory] {
    match check {
        SentimentCheck::ThreateningLanguage => &[EntityCategory::Threatening],
        SentimentCheck::Profanity | SentimentCheck::FraudulentRepresentation => &[],
    }
}

impl RuleStrategy for SentimentStrategy {
    fn kind(&self) -> RuleKind {
        RuleKind::Sentiment
    }

    fn evaluate(
        &self,
        rule: &Rule,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Decision, EvaluationError> {
        let RuleLogic::Sentiment { check } = &rule.logic else {
            return Err(mismatch(self.kind(), rule.logic.kind()));
        };

        let hits = vocabulary_for(*check).find_terms(ctx.transcript);
        if !hits.is_empty() {
            tracing::debug!(
                rule_id = %rule.rule_id,
                check = check.as_str(),
                terms = ?hits,
                "sentiment vocabulary matched"
            );
        }
        let evidence = partition_entities(
            ctx.entities,
            consulted_categories(*check),
            self.evidence_threshold,
            self.review_threshold,
        );
        Ok(Decision::with_evidence(!hits.is_empty(), evidence))
    }
}
