//! Extraction adapter: chunking, pacing, thresholds, and bucket routing.
//!
//! Extraction is total. A recognizer failure on one chunk drops that chunk
//! and keeps the rest; a failure of every chunk degrades to an empty bag
//! carrying the error marker. The pipeline never stalls on extraction.

pub mod chunker;
pub mod lexicon;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use hark_core::config::ExtractionConfig;
use hark_core::traits::{ArtifactSink, ChunkAnalysis, EntityKind, EntityRecognizer};
use hark_core::types::{Entity, EntityBag, EntityCategory};

pub use chunker::chunk_text;
pub use lexicon::LexiconRecognizer;

use crate::vocab;

/// Per-call extraction context. Carries the call identity explicitly so the
/// adapter stays free of ambient state and is safe to share across worker
/// threads.
#[derive(Debug, Clone, Default)]
pub struct ExtractionContext {
    pub call_id: Option<String>,
}

impl ExtractionContext {
    pub fn for_call(call_id: impl Into<String>) -> Self {
        Self {
            call_id: Some(call_id.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// What one extraction run produced, for logging and event emission.
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub bag: EntityBag,
    pub chunk_count: usize,
    pub failed_chunks: usize,
    /// Key of the persisted audit artifact, when the sink accepted it.
    pub artifact_key: Option<String>,
    pub duration_ms: u64,
}

/// Drives a recognizer over a chunked transcript and buckets the results.
pub struct EntityExtractor {
    config: ExtractionConfig,
    recognizer: Arc<dyn EntityRecognizer>,
    sink: Arc<dyn ArtifactSink>,
}

impl EntityExtractor {
    pub fn new(
        config: ExtractionConfig,
        recognizer: Arc<dyn EntityRecognizer>,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        Self {
            config,
            recognizer,
            sink,
        }
    }

    /// Extracts everything from `transcript`. Never fails: degraded runs
    /// return a bag with the `error` marker set.
    pub fn extract(&self, transcript: &str, ctx: &ExtractionContext) -> ExtractionReport {
        let started = Instant::now();
        let chunks = chunker::chunk_text(transcript, self.config.effective_chunk_limit());
        let delay_ms = self.config.effective_chunk_delay_ms();

        let mut bag = EntityBag::new();
        let mut failed_chunks = 0;
        for (index, chunk) in chunks.iter().enumerate() {
            // Pacing applies between submissions, never before the first.
            if index > 0 && delay_ms > 0 {
                thread::sleep(Duration::from_millis(delay_ms));
            }
            match self.recognizer.analyze(chunk) {
                Ok(analysis) => self.merge(analysis, &mut bag),
                Err(e) => {
                    failed_chunks += 1;
                    tracing::warn!(
                        chunk = index,
                        recognizer = self.recognizer.name(),
                        error = %e,
                        "chunk analysis failed; chunk dropped"
                    );
                }
            }
        }
        if failed_chunks == chunks.len() && !chunks.is_empty() {
            bag = EntityBag::with_error(format!(
                "all {failed_chunks} chunks failed {} analysis",
                self.recognizer.name()
            ));
        }

        let artifact_key = self.persist(&bag, ctx);
        let duration_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(
            call_id = ctx.call_id.as_deref().unwrap_or("-"),
            chunks = chunks.len(),
            entities = bag.total_count(),
            duration_ms,
            "extraction finished"
        );
        ExtractionReport {
            bag,
            chunk_count: chunks.len(),
            failed_chunks,
            artifact_key,
            duration_ms,
        }
    }

    /// Applies retention thresholds and routes recognizer output into bag
    /// categories. Thresholds are strict: a span at exactly the threshold is
    /// dropped.
    fn merge(&self, analysis: ChunkAnalysis, bag: &mut EntityBag) {
        let general = self.config.effective_confidence_threshold();
        let pii = self.config.effective_pii_confidence_threshold();

        for entity in analysis.entities {
            if entity.confidence <= general {
                continue;
            }
            let category = match entity.kind {
                EntityKind::Person => EntityCategory::Persons,
                EntityKind::Organization => EntityCategory::Organizations,
                EntityKind::Location => EntityCategory::Geographic,
                EntityKind::Other => continue,
            };
            bag.push(category, Entity::new(entity.text, entity.confidence));
        }

        for phrase in analysis.key_phrases {
            if phrase.confidence <= general {
                continue;
            }
            // Phrases outside every bucket vocabulary are noise and dropped.
            if let Some(category) = vocab::bucket_for_phrase(&phrase.text) {
                bag.push(category, Entity::new(phrase.text, phrase.confidence));
            }
        }

        for span in analysis.pii {
            if span.confidence <= pii {
                continue;
            }
            bag.push(
                EntityCategory::Pii,
                Entity::with_kind(span.text, span.confidence, span.kind),
            );
        }
    }

    /// Writes the serialized bag to the artifact sink. Sink trouble is an
    /// audit gap, not an extraction failure.
    fn persist(&self, bag: &EntityBag, ctx: &ExtractionContext) -> Option<String> {
        let payload = match serde_json::to_string(bag) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "entity bag serialization failed; artifact skipped");
                return None;
            }
        };
        match self.sink.persist_entities(ctx.call_id.as_deref(), &payload) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::warn!(error = %e, "artifact sink rejected entity payload");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hark_core::errors::ExtractionError;
    use hark_core::traits::{NullArtifactSink, RecognizedEntity, RecognizedPhrase, RecognizedPii};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_config() -> ExtractionConfig {
        ExtractionConfig {
            chunk_limit: Some(40),
            chunk_delay_ms: Some(0),
            confidence_threshold: None,
            pii_confidence_threshold: None,
        }
    }

    fn extractor_with(recognizer: Arc<dyn EntityRecognizer>) -> EntityExtractor {
        EntityExtractor::new(test_config(), recognizer, Arc::new(NullArtifactSink))
    }

    /// Fails on every even-indexed call.
    struct FlakyRecognizer {
        calls: AtomicUsize,
    }

    impl EntityRecognizer for FlakyRecognizer {
        fn analyze(&self, _chunk: &str) -> Result<ChunkAnalysis, ExtractionError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call % 2 == 0 {
                return Err(ExtractionError::RecognizerFailure("flaky".to_string()));
            }
            Ok(ChunkAnalysis {
                entities: vec![RecognizedEntity {
                    text: "John Smith".to_string(),
                    confidence: 0.9,
                    kind: EntityKind::Person,
                }],
                key_phrases: Vec::new(),
                pii: Vec::new(),
            })
        }
    }

    struct AlwaysFailing;

    impl EntityRecognizer for AlwaysFailing {
        fn analyze(&self, _chunk: &str) -> Result<ChunkAnalysis, ExtractionError> {
            Err(ExtractionError::RecognizerFailure("down".to_string()))
        }
    }

    #[test]
    fn test_failed_chunk_is_isolated() {
        let extractor = extractor_with(Arc::new(FlakyRecognizer {
            calls: AtomicUsize::new(0),
        }));
        // Four chunks of ~40 chars; odd-indexed calls succeed.
        let transcript = "word ".repeat(32);
        let report = extractor.extract(&transcript, &ExtractionContext::anonymous());
        assert!(report.chunk_count > 1);
        assert!(report.failed_chunks > 0);
        assert!(report.failed_chunks < report.chunk_count);
        assert!(!report.bag.persons.is_empty());
        assert!(report.bag.error.is_none());
    }

    #[test]
    fn test_total_failure_degrades_to_error_bag() {
        let extractor = extractor_with(Arc::new(AlwaysFailing));
        let report = extractor.extract("some transcript text", &ExtractionContext::anonymous());
        assert!(report.bag.is_empty());
        assert!(report.bag.error.as_deref().unwrap_or("").contains("chunks failed"));
    }

    #[test]
    fn test_empty_transcript_is_an_empty_clean_bag() {
        let extractor = extractor_with(Arc::new(AlwaysFailing));
        let report = extractor.extract("", &ExtractionContext::anonymous());
        assert_eq!(report.chunk_count, 0);
        assert!(report.bag.is_empty());
        assert!(report.bag.error.is_none());
    }

    /// Emits fixed spans at controlled confidences on every chunk.
    struct FixedRecognizer;

    impl EntityRecognizer for FixedRecognizer {
        fn analyze(&self, _chunk: &str) -> Result<ChunkAnalysis, ExtractionError> {
            Ok(ChunkAnalysis {
                entities: vec![
                    RecognizedEntity {
                        text: "John Smith".to_string(),
                        confidence: 0.71,
                        kind: EntityKind::Person,
                    },
                    RecognizedEntity {
                        text: "Jane Doe".to_string(),
                        confidence: 0.70,
                        kind: EntityKind::Person,
                    },
                    RecognizedEntity {
                        text: "Texas".to_string(),
                        confidence: 0.95,
                        kind: EntityKind::Location,
                    },
                ],
                key_phrases: vec![
                    RecognizedPhrase {
                        text: "make a payment today".to_string(),
                        confidence: 0.9,
                    },
                    RecognizedPhrase {
                        text: "the weather is nice".to_string(),
                        confidence: 0.9,
                    },
                ],
                pii: vec![
                    RecognizedPii {
                        text: "123-45-6789".to_string(),
                        confidence: 0.97,
                        kind: "SSN".to_string(),
                    },
                    RecognizedPii {
                        text: "555-123-4567".to_string(),
                        confidence: 0.80,
                        kind: "PHONE".to_string(),
                    },
                ],
            })
        }
    }

    #[test]
    fn test_thresholds_are_strict_and_routing_applies() {
        let extractor = extractor_with(Arc::new(FixedRecognizer));
        let report = extractor.extract("short text", &ExtractionContext::anonymous());
        let bag = &report.bag;

        // 0.71 survives the 0.7 line, 0.70 does not.
        assert_eq!(bag.persons.len(), 1);
        assert_eq!(bag.persons[0].text, "John Smith");
        // Locations land in geographic.
        assert_eq!(bag.geographic.len(), 1);
        // The financial phrase buckets; the unmatched phrase is dropped.
        assert_eq!(bag.financial.len(), 1);
        // 0.80 PII sits on the threshold and is dropped.
        assert_eq!(bag.pii.len(), 1);
        assert_eq!(bag.pii[0].kind.as_deref(), Some("SSN"));
    }

    /// Records persisted payloads.
    struct CapturingSink {
        calls: AtomicUsize,
    }

    impl ArtifactSink for CapturingSink {
        fn persist_entities(
            &self,
            call_id: Option<&str>,
            payload_json: &str,
        ) -> Result<String, ExtractionError> {
            assert_eq!(call_id, Some("VM-2024-000123"));
            assert!(payload_json.contains("persons"));
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("artifact-1".to_string())
        }
    }

    #[test]
    fn test_artifact_sink_receives_serialized_bag() {
        let sink = Arc::new(CapturingSink {
            calls: AtomicUsize::new(0),
        });
        let extractor = EntityExtractor::new(test_config(), Arc::new(FixedRecognizer), sink.clone());
        let report = extractor.extract(
            "short text",
            &ExtractionContext::for_call("VM-2024-000123"),
        );
        assert_eq!(report.artifact_key.as_deref(), Some("artifact-1"));
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    }

    struct RejectingSink;

    impl ArtifactSink for RejectingSink {
        fn persist_entities(
            &self,
            _call_id: Option<&str>,
            _payload_json: &str,
        ) -> Result<String, ExtractionError> {
            Err(ExtractionError::ArtifactSinkFailure("disk full".to_string()))
        }
    }

    #[test]
    fn test_sink_failure_does_not_fail_extraction() {
        let extractor = EntityExtractor::new(
            test_config(),
            Arc::new(FixedRecognizer),
            Arc::new(RejectingSink),
        );
        let report = extractor.extract("short text", &ExtractionContext::anonymous());
        assert!(report.artifact_key.is_none());
        assert!(!report.bag.is_empty());
    }
}
