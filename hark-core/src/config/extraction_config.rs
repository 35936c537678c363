//! Entity extraction configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Configuration for the extraction subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum characters per chunk. Default: 4500.
    pub chunk_limit: Option<usize>,
    /// Pacing delay between chunk submissions in milliseconds. Default: 100.
    pub chunk_delay_ms: Option<u64>,
    /// Retention threshold for general entities and key phrases. Default: 0.7.
    pub confidence_threshold: Option<f64>,
    /// Retention threshold for PII spans. Default: 0.8.
    pub pii_confidence_threshold: Option<f64>,
}

impl ExtractionConfig {
    /// Returns the effective chunk limit, defaulting to 4500 characters.
    pub fn effective_chunk_limit(&self) -> usize {
        self.chunk_limit.unwrap_or(constants::MAX_CHUNK_CHARS)
    }

    /// Returns the effective inter-chunk delay, defaulting to 100 ms.
    pub fn effective_chunk_delay_ms(&self) -> u64 {
        self.chunk_delay_ms.unwrap_or(constants::CHUNK_DELAY_MS)
    }

    /// Returns the effective general retention threshold, defaulting to 0.7.
    pub fn effective_confidence_threshold(&self) -> f64 {
        self.confidence_threshold
            .unwrap_or(constants::GENERAL_CONFIDENCE_THRESHOLD)
    }

    /// Returns the effective PII retention threshold, defaulting to 0.8.
    pub fn effective_pii_confidence_threshold(&self) -> f64 {
        self.pii_confidence_threshold
            .unwrap_or(constants::PII_CONFIDENCE_THRESHOLD)
    }
}
