//! Event handler trait with default no-op methods.

use super::types::*;

/// Observer for pipeline lifecycle events.
///
/// Every method defaults to a no-op, so handlers implement only what they
/// care about. Handlers must be panic-tolerant neighbors: the dispatcher
/// isolates a panicking handler, but it cannot undo its side effects.
pub trait HarkEventHandler: Send + Sync {
    fn on_extraction_completed(&self, _event: &ExtractionCompletedEvent) {}
    fn on_extraction_failed(&self, _event: &ExtractionFailedEvent) {}
    fn on_entities_persisted(&self, _event: &EntitiesPersistedEvent) {}
    fn on_reference_resolved(&self, _event: &ReferenceResolvedEvent) {}
    fn on_rule_skipped(&self, _event: &RuleSkippedEvent) {}
    fn on_violation_detected(&self, _event: &ViolationDetectedEvent) {}
    fn on_evaluation_started(&self, _event: &EvaluationStartedEvent) {}
    fn on_evaluation_completed(&self, _event: &EvaluationCompletedEvent) {}
    fn on_call_status_changed(&self, _event: &CallStatusChangedEvent) {}
    fn on_error(&self, _event: &ErrorEvent) {}
}
