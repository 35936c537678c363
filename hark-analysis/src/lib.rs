//! Analysis engine for the Hark compliance pipeline.
//!
//! Turns raw transcript text plus resolved reference data into compliance
//! decisions. The flow is: chunk the transcript, run entity extraction,
//! resolve the reference record, evaluate every active rule through its
//! strategy, and aggregate the decisions into violation records and
//! fleet-level metrics.

pub mod aggregator;
pub mod evaluator;
pub mod extraction;
pub mod matcher;
pub mod metrics;
pub mod pii_patterns;
pub mod resolver;
pub mod vocab;

pub use aggregator::{evaluate_transcript, SkippedRule, TranscriptEvaluation, ViolationTotals};
pub use evaluator::{Decision, EvaluationContext, RuleEvaluator};
pub use extraction::{EntityExtractor, ExtractionContext, ExtractionReport, LexiconRecognizer};
pub use resolver::{resolve_call_id, resolve_reference, ReferenceNamespace};
