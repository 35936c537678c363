//! EventDispatcher - synchronous event dispatch with zero overhead when empty.

use std::sync::Arc;

use super::handler::HarkEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
///
/// When no handlers are registered, `emit` iterates over an empty Vec;
/// effectively zero cost. The compiler may optimize it away entirely.
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn HarkEventHandler>>,
}

impl EventDispatcher {
    /// Create a new empty dispatcher.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register an event handler.
    pub fn register(&mut self, handler: Arc<dyn HarkEventHandler>) {
        self.handlers.push(handler);
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Emit an event to all registered handlers.
    /// Handlers that panic are caught and do not prevent subsequent
    /// handlers from receiving the event.
    fn emit<F: Fn(&dyn HarkEventHandler)>(&self, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::warn!("event handler panicked; continuing with remaining handlers");
            }
        }
    }

    // ---- Extraction ----
    pub fn emit_extraction_completed(&self, event: &ExtractionCompletedEvent) {
        self.emit(|h| h.on_extraction_completed(event));
    }

    pub fn emit_extraction_failed(&self, event: &ExtractionFailedEvent) {
        self.emit(|h| h.on_extraction_failed(event));
    }

    pub fn emit_entities_persisted(&self, event: &EntitiesPersistedEvent) {
        self.emit(|h| h.on_entities_persisted(event));
    }

    // ---- Resolution ----
    pub fn emit_reference_resolved(&self, event: &ReferenceResolvedEvent) {
        self.emit(|h| h.on_reference_resolved(event));
    }

    // ---- Evaluation ----
    pub fn emit_rule_skipped(&self, event: &RuleSkippedEvent) {
        self.emit(|h| h.on_rule_skipped(event));
    }

    pub fn emit_violation_detected(&self, event: &ViolationDetectedEvent) {
        self.emit(|h| h.on_violation_detected(event));
    }

    pub fn emit_evaluation_started(&self, event: &EvaluationStartedEvent) {
        self.emit(|h| h.on_evaluation_started(event));
    }

    pub fn emit_evaluation_completed(&self, event: &EvaluationCompletedEvent) {
        self.emit(|h| h.on_evaluation_completed(event));
    }

    // ---- Calls ----
    pub fn emit_call_status_changed(&self, event: &CallStatusChangedEvent) {
        self.emit(|h| h.on_call_status_changed(event));
    }

    // ---- Errors ----
    pub fn emit_error(&self, event: &ErrorEvent) {
        self.emit(|h| h.on_error(event));
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

// Safety: EventDispatcher is Send + Sync because all handlers are Arc<dyn Send + Sync>.
unsafe impl Send for EventDispatcher {}
unsafe impl Sync for EventDispatcher {}
