//! Strategy registry: logic kind to strategy instance.

use std::sync::Arc;

use hark_core::config::EvaluationConfig;
use hark_core::errors::EvaluationError;
use hark_core::types::RuleKind;
use rustc_hash::FxHashMap;

use crate::evaluator::strategies::{
    ComplexValidationStrategy, ConditionalPatternStrategy, ConditionalReferenceStrategy,
    FallbackStrategy, PatternMatchStrategy, PiiDetectionStrategy, ReferenceCheckStrategy,
    ReferenceMatchStrategy, ReferenceValidationStrategy, RuleStrategy, SentimentStrategy,
    SystemCheckStrategy,
};

/// Holds one strategy per rule logic kind. The pattern matcher and its
/// compiled-regex cache are shared across the pattern-driven strategies.
pub struct StrategyRegistry {
    strategies: FxHashMap<RuleKind, Box<dyn RuleStrategy>>,
}

impl StrategyRegistry {
    /// Builds the full strategy set from the evaluation configuration.
    pub fn with_all_strategies(config: &EvaluationConfig) -> Result<Self, EvaluationError> {
        let matcher = Arc::new(crate::matcher::PatternMatcher::new(
            config.effective_pattern_cache_capacity(),
        ));
        let opening = config.effective_opening_window_words();
        let evidence = config.effective_evidence_threshold();
        let review = config.effective_review_quality_threshold();

        let mut registry = Self {
            strategies: FxHashMap::default(),
        };
        registry.register(Box::new(PatternMatchStrategy::new(
            Arc::clone(&matcher),
            opening,
            evidence,
            review,
        )));
        registry.register(Box::new(ConditionalPatternStrategy::new(Arc::clone(
            &matcher,
        ))));
        registry.register(Box::new(ReferenceCheckStrategy::new(evidence, review)));
        registry.register(Box::new(ConditionalReferenceStrategy::new(Arc::clone(
            &matcher,
        ))));
        registry.register(Box::new(ReferenceValidationStrategy::new(evidence, review)));
        registry.register(Box::new(ReferenceMatchStrategy::new(evidence, review)));
        registry.register(Box::new(SystemCheckStrategy));
        registry.register(Box::new(SentimentStrategy::new(evidence, review)));
        registry.register(Box::new(PiiDetectionStrategy::new(evidence, review)?));
        registry.register(Box::new(ComplexValidationStrategy));
        registry.register(Box::new(FallbackStrategy::new(matcher)));
        Ok(registry)
    }

    /// Registers a strategy under its own kind, replacing any existing one.
    pub(crate) fn register(&mut self, strategy: Box<dyn RuleStrategy>) {
        self.strategies.insert(strategy.kind(), strategy);
    }

    pub fn strategy_for(&self, kind: RuleKind) -> Option<&dyn RuleStrategy> {
        self.strategies.get(&kind).map(Box::as_ref)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}
