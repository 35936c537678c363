//! Rule evaluation configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Configuration for the evaluation subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Words approximating the first sixty seconds. Default: 150.
    pub opening_window_words: Option<usize>,
    /// Confidence line between evidence and low-confidence entries.
    /// Default: 0.8.
    pub evidence_threshold: Option<f64>,
    /// Quality scores below this force manual review. Default: 0.8.
    pub review_quality_threshold: Option<f64>,
    /// Compiled-pattern cache capacity. Default: 1024.
    pub pattern_cache_capacity: Option<u64>,
}

impl EvaluationConfig {
    /// Returns the effective opening window, defaulting to 150 words.
    pub fn effective_opening_window_words(&self) -> usize {
        self.opening_window_words
            .unwrap_or(constants::OPENING_WINDOW_WORDS)
    }

    /// Returns the effective evidence threshold, defaulting to 0.8.
    pub fn effective_evidence_threshold(&self) -> f64 {
        self.evidence_threshold
            .unwrap_or(constants::EVIDENCE_CONFIDENCE_THRESHOLD)
    }

    /// Returns the effective review threshold, defaulting to 0.8.
    pub fn effective_review_quality_threshold(&self) -> f64 {
        self.review_quality_threshold
            .unwrap_or(constants::REVIEW_QUALITY_THRESHOLD)
    }

    /// Returns the effective pattern cache capacity, defaulting to 1024.
    pub fn effective_pattern_cache_capacity(&self) -> u64 {
        self.pattern_cache_capacity
            .unwrap_or(constants::DEFAULT_PATTERN_CACHE_CAPACITY)
    }
}
