//! EntityRecognizer trait: the seam to the NLP service.
//!
//! In standalone mode the built-in lexicon recognizer (hark-analysis)
//! implements this trait deterministically. Deployments wire a real NLP
//! backend behind the same trait; the extraction adapter never knows the
//! difference.

use crate::errors::ExtractionError;

/// A named entity span recognized in one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedEntity {
    pub text: String,
    pub confidence: f64,
    pub kind: EntityKind,
}

/// Coarse named-entity classes the adapter routes into bag categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Person,
    Organization,
    Location,
    Other,
}

/// A key phrase recognized in one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedPhrase {
    pub text: String,
    pub confidence: f64,
}

/// A PII span recognized in one chunk, with its subtype label.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedPii {
    pub text: String,
    pub confidence: f64,
    pub kind: String,
}

/// Raw recognizer output for a single chunk, before thresholds and
/// bucketing are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkAnalysis {
    pub entities: Vec<RecognizedEntity>,
    pub key_phrases: Vec<RecognizedPhrase>,
    pub pii: Vec<RecognizedPii>,
}

/// Recognizes entities, key phrases, and PII in one transcript chunk.
pub trait EntityRecognizer: Send + Sync {
    /// Analyze a single chunk. Errors are isolated per chunk by the
    /// extraction adapter.
    fn analyze(&self, chunk: &str) -> Result<ChunkAnalysis, ExtractionError>;

    /// Human-readable backend name for logs and artifacts.
    fn name(&self) -> &'static str {
        "recognizer"
    }
}

/// No-op recognizer that finds nothing. Useful in tests and as an
/// explicit "extraction disabled" backend.
pub struct NullRecognizer;

impl EntityRecognizer for NullRecognizer {
    fn analyze(&self, _chunk: &str) -> Result<ChunkAnalysis, ExtractionError> {
        Ok(ChunkAnalysis::default())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_recognizer_finds_nothing() {
        let recognizer = NullRecognizer;
        let analysis = recognizer.analyze("this is John Smith").unwrap();
        assert!(analysis.entities.is_empty());
        assert!(analysis.key_phrases.is_empty());
        assert!(analysis.pii.is_empty());
        assert_eq!(recognizer.name(), "null");
    }
}
