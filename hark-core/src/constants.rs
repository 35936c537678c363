//! Numeric and string constants that pin evaluation behavior.
//!
//! Configuration may override most of these per run; the constants are the
//! compiled defaults and the values the test suite asserts against.

/// Maximum characters per extraction chunk, split on word boundaries.
pub const MAX_CHUNK_CHARS: usize = 4_500;

/// Fixed pacing delay between consecutive chunk submissions.
/// The first chunk is never delayed.
pub const CHUNK_DELAY_MS: u64 = 100;

/// Entities and key phrases below or at this confidence are discarded.
pub const GENERAL_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// PII spans below or at this confidence are discarded.
pub const PII_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Consulted entities at or above this confidence count as evidence;
/// below it they become low-confidence entries.
pub const EVIDENCE_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Quality scores below this mark a violation for manual review.
pub const REVIEW_QUALITY_THRESHOLD: f64 = 0.8;

/// Word count approximating the first sixty seconds of a call.
pub const OPENING_WINDOW_WORDS: usize = 150;

/// Reason string attached to every low-confidence evidence entry.
pub const LOW_CONFIDENCE_REASON: &str = "Below 80% confidence threshold";

/// Default capacity of the compiled-pattern cache.
pub const DEFAULT_PATTERN_CACHE_CAPACITY: u64 = 1_024;

/// Default capacity of the background artifact writer queue.
pub const DEFAULT_ARTIFACT_QUEUE_CAPACITY: usize = 256;

/// Transcript placeholder written when transcription fails upstream.
pub const TRANSCRIPTION_FAILED_MARKER: &str = "TRANSCRIPTION_FAILED";

/// Display format for the violation record date field.
pub const VIOLATION_DATE_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";
