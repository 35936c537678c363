//! Event payload types for the Hark pipeline.

/// Payload for `on_extraction_completed`.
#[derive(Debug, Clone)]
pub struct ExtractionCompletedEvent {
    pub call_id: Option<String>,
    pub chunk_count: usize,
    pub entity_count: usize,
    pub duration_ms: u64,
}

/// Payload for `on_extraction_failed`.
#[derive(Debug, Clone)]
pub struct ExtractionFailedEvent {
    pub call_id: Option<String>,
    pub message: String,
}

/// Payload for `on_entities_persisted`.
#[derive(Debug, Clone)]
pub struct EntitiesPersistedEvent {
    pub call_id: Option<String>,
    pub artifact_key: String,
}

/// Payload for `on_reference_resolved`.
#[derive(Debug, Clone)]
pub struct ReferenceResolvedEvent {
    pub jurisdiction_id: String,
    /// Which namespace answered: `voicemail`, `master`, or `default`.
    pub source: String,
}

/// Payload for `on_rule_skipped`.
#[derive(Debug, Clone)]
pub struct RuleSkippedEvent {
    pub rule_id: String,
    pub message: String,
}

/// Payload for `on_violation_detected`.
#[derive(Debug, Clone)]
pub struct ViolationDetectedEvent {
    pub call_id: String,
    pub rule_id: String,
    pub severity: String,
}

/// Payload for `on_evaluation_started`.
#[derive(Debug, Clone)]
pub struct EvaluationStartedEvent {
    pub call_id: String,
    pub rule_count: usize,
}

/// Payload for `on_evaluation_completed`.
#[derive(Debug, Clone)]
pub struct EvaluationCompletedEvent {
    pub call_id: String,
    pub violation_count: usize,
    pub manual_review_count: usize,
    pub duration_ms: u64,
}

/// Payload for `on_call_status_changed`.
#[derive(Debug, Clone)]
pub struct CallStatusChangedEvent {
    pub call_id: String,
    pub status: String,
}

/// Payload for `on_error`.
#[derive(Debug, Clone)]
pub struct ErrorEvent {
    pub message: String,
    pub error_code: String,
}
