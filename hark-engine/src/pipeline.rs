//! The end-to-end call pipeline.
//!
//! One call flows ingest -> extract -> resolve -> evaluate -> persist, with
//! events emitted at each stage boundary. Every stage degrades instead of
//! aborting: failures are collected in the returned [`PipelineResult`] and
//! the call record ends up `completed` or `failed`, never half-written.

use std::time::Instant;

use chrono::Local;
use hark_analysis::{
    evaluate_transcript, resolve_call_id, resolve_reference, ExtractionContext, SkippedRule,
    TranscriptEvaluation, ViolationTotals,
};
use hark_core::errors::{
    ExtractionError, HarkErrorCode, PipelineError, PipelineResult, StorageError,
};
use hark_core::events::{
    CallStatusChangedEvent, EntitiesPersistedEvent, ErrorEvent, EvaluationCompletedEvent,
    EvaluationStartedEvent, ExtractionCompletedEvent, ExtractionFailedEvent,
    ReferenceResolvedEvent, RuleSkippedEvent, ViolationDetectedEvent,
};
use hark_core::types::{EntityBag, Rule, ViolationRecord};
use hark_storage::connection::writer::with_immediate_transaction;
use hark_storage::now_ms;
use hark_storage::queries::{audit, calls};
use rayon::prelude::*;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::catalog::load_active_rules;
use crate::runtime::HarkRuntime;

/// One call to process: a transcript plus whatever identity came with it.
///
/// `filename` drives jurisdiction resolution when present; `call_id` pins
/// the storage key. With neither, a generated id covers both roles.
#[derive(Debug, Clone, Default)]
pub struct CallInput {
    pub filename: Option<String>,
    pub call_id: Option<String>,
    pub transcript: String,
}

impl CallInput {
    /// A call identified by its source audio filename.
    pub fn from_file(filename: impl Into<String>, transcript: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            call_id: None,
            transcript: transcript.into(),
        }
    }

    /// A call identified directly by id.
    pub fn for_call(call_id: impl Into<String>, transcript: impl Into<String>) -> Self {
        Self {
            filename: None,
            call_id: Some(call_id.into()),
            transcript: transcript.into(),
        }
    }
}

/// Terminal state of a processed call record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallStatus {
    Completed,
    #[default]
    Failed,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Completed => "completed",
            CallStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one pipeline pass produced for a call.
#[derive(Debug, Default)]
pub struct ProcessedCall {
    pub call_id: String,
    /// Reference lookup key, resolved from the filename when one was given.
    pub jurisdiction_id: String,
    pub status: CallStatus,
    pub entities: EntityBag,
    pub violations: Vec<ViolationRecord>,
    pub totals: ViolationTotals,
    pub rules_evaluated: usize,
    pub skipped: Vec<SkippedRule>,
    /// Which namespace answered the reference lookup.
    pub reference_namespace: String,
    pub processed_at: i64,
    pub duration_ms: u64,
}

/// Process one transcript end to end with the current active rule set.
pub fn process_transcript(runtime: &HarkRuntime, input: &CallInput) -> PipelineResult<ProcessedCall> {
    let (rules, load_error) = load_rules_degraded(runtime);
    let mut result = process_with_rules(runtime, &rules, input);
    if let Some(e) = load_error {
        result.add_error(e);
    }
    result
}

/// Process a batch of transcripts in parallel.
///
/// The active rule set is loaded once. Items are isolated: a failure in one
/// degrades that item alone, and outputs come back in input order.
pub fn process_batch(
    runtime: &HarkRuntime,
    inputs: &[CallInput],
) -> PipelineResult<Vec<ProcessedCall>> {
    let started = Instant::now();
    let (rules, load_error) = load_rules_degraded(runtime);

    let per_call: Vec<PipelineResult<ProcessedCall>> = inputs
        .par_iter()
        .map(|input| process_with_rules(runtime, &rules, input))
        .collect();

    let mut result = PipelineResult::new(Vec::with_capacity(per_call.len()));
    if let Some(e) = load_error {
        result.add_error(e);
    }
    for item in per_call {
        result.data.push(item.data);
        result.errors.extend(item.errors);
    }

    // Batch boundary: settle the artifact queue and compact the WAL.
    if let Err(e) = runtime.artifacts.flush() {
        warn!(error = %e, "artifact flush after batch failed");
    }
    if let Err(e) = runtime.db.checkpoint() {
        warn!(error = %e, "checkpoint after batch failed");
    }

    info!(
        calls = inputs.len(),
        errors = result.error_count(),
        duration_ms = started.elapsed().as_millis() as u64,
        "batch finished"
    );
    result
}

/// Record that a call is being transcribed, ahead of its transcript.
///
/// Re-recording an id restarts the record and clears prior violations.
pub fn record_transcribing(
    runtime: &HarkRuntime,
    call_id: &str,
    filename: Option<&str>,
) -> Result<(), PipelineError> {
    let jurisdiction_id = filename.map(resolve_call_id);
    runtime.db.with_writer(|conn| {
        calls::insert_transcribing(conn, call_id, filename, jurisdiction_id.as_deref(), now_ms())
    })?;
    runtime.dispatcher.emit_call_status_changed(&CallStatusChangedEvent {
        call_id: call_id.to_string(),
        status: "transcribing".to_string(),
    });
    Ok(())
}

/// Record that transcription failed upstream. Returns false for an unknown
/// call id.
pub fn record_transcription_failure(
    runtime: &HarkRuntime,
    call_id: &str,
    error: &str,
) -> Result<bool, PipelineError> {
    let changed = runtime
        .db
        .with_writer(|conn| calls::mark_failed(conn, call_id, error, now_ms()))?;
    if changed {
        runtime.dispatcher.emit_call_status_changed(&CallStatusChangedEvent {
            call_id: call_id.to_string(),
            status: "failed".to_string(),
        });
    }
    Ok(changed)
}

fn load_rules_degraded(runtime: &HarkRuntime) -> (Vec<Rule>, Option<PipelineError>) {
    match load_active_rules(&runtime.db) {
        Ok(rules) => (rules, None),
        Err(e) => {
            error!(error = %e, "active rule load failed, evaluating with no rules");
            (Vec::new(), Some(PipelineError::Storage(e)))
        }
    }
}

/// The per-call pass. Total: every exit path yields a `ProcessedCall`.
fn process_with_rules(
    runtime: &HarkRuntime,
    rules: &[Rule],
    input: &CallInput,
) -> PipelineResult<ProcessedCall> {
    let started = Instant::now();
    let (call_id, jurisdiction_id) = resolve_ids(input);
    let mut errors: Vec<PipelineError> = Vec::new();

    // Ingest. A failure here is carried forward: the completion update will
    // find no row and the call lands on the failed path.
    match runtime.db.with_writer(|conn| {
        calls::insert_transcribing(
            conn,
            &call_id,
            input.filename.as_deref(),
            Some(jurisdiction_id.as_str()),
            now_ms(),
        )
    }) {
        Ok(()) => {
            runtime.dispatcher.emit_call_status_changed(&CallStatusChangedEvent {
                call_id: call_id.clone(),
                status: "transcribing".to_string(),
            });
        }
        Err(e) => {
            error!(call_id = %call_id, error = %e, "call ingest failed");
            errors.push(PipelineError::Storage(e));
        }
    }

    let run_id = match runtime
        .db
        .with_writer(|conn| audit::insert_run_start(conn, now_ms(), Some(call_id.as_str())))
    {
        Ok(id) => Some(id),
        Err(e) => {
            error!(call_id = %call_id, error = %e, "run history insert failed");
            None
        }
    };

    // Extraction never fails; a degraded bag carries its error marker.
    let extraction = runtime
        .extractor
        .extract(&input.transcript, &ExtractionContext::for_call(call_id.clone()));
    if let Some(message) = &extraction.bag.error {
        runtime.dispatcher.emit_extraction_failed(&ExtractionFailedEvent {
            call_id: Some(call_id.clone()),
            message: message.clone(),
        });
        errors.push(PipelineError::Extraction(ExtractionError::RecognizerFailure(
            message.clone(),
        )));
    } else {
        runtime
            .dispatcher
            .emit_extraction_completed(&ExtractionCompletedEvent {
                call_id: Some(call_id.clone()),
                chunk_count: extraction.chunk_count,
                entity_count: extraction.bag.total_count(),
                duration_ms: extraction.duration_ms,
            });
    }
    if let Some(artifact_key) = &extraction.artifact_key {
        runtime
            .dispatcher
            .emit_entities_persisted(&EntitiesPersistedEvent {
                call_id: Some(call_id.clone()),
                artifact_key: artifact_key.clone(),
            });
    }

    let (reference, namespace) = resolve_reference(&*runtime.reference_source, &jurisdiction_id);
    runtime
        .dispatcher
        .emit_reference_resolved(&ReferenceResolvedEvent {
            jurisdiction_id: jurisdiction_id.clone(),
            source: namespace.as_str().to_string(),
        });

    runtime
        .dispatcher
        .emit_evaluation_started(&EvaluationStartedEvent {
            call_id: call_id.clone(),
            rule_count: rules.len(),
        });
    let evaluation = evaluate_transcript(
        &runtime.evaluator,
        rules,
        &call_id,
        &input.transcript,
        &extraction.bag,
        &reference,
        Local::now(),
    );
    emit_evaluation_events(runtime, &call_id, &evaluation, started.elapsed().as_millis() as u64);

    // Persist the outcome atomically; on failure fall back to a failed mark.
    let processed_at = now_ms();
    let status = match persist_completed(runtime, &call_id, &input.transcript, &extraction.bag, &evaluation.violations, processed_at)
    {
        Ok(()) => CallStatus::Completed,
        Err(e) => {
            error!(call_id = %call_id, error = %e, "persisting call outcome failed");
            let message = e.to_string();
            let code = e.error_code().to_string();
            errors.push(PipelineError::Storage(e));
            mark_failed_degraded(runtime, &call_id, &message, processed_at);
            runtime.dispatcher.emit_error(&ErrorEvent {
                message,
                error_code: code,
            });
            CallStatus::Failed
        }
    };
    runtime.dispatcher.emit_call_status_changed(&CallStatusChangedEvent {
        call_id: call_id.clone(),
        status: status.as_str().to_string(),
    });

    let duration_ms = started.elapsed().as_millis() as u64;
    if let Some(id) = run_id {
        let run = runtime.db.with_writer(|conn| {
            audit::update_run_complete(
                conn,
                id,
                now_ms(),
                evaluation.rules_evaluated as i64,
                evaluation.totals.total as i64,
                evaluation.skipped.len() as i64,
                duration_ms as i64,
                status.as_str(),
                errors.first().map(|e| e.to_string()).as_deref(),
            )
        });
        if let Err(e) = run {
            error!(call_id = %call_id, error = %e, "run history update failed");
        }
    }

    let mut result = PipelineResult::new(ProcessedCall {
        call_id,
        jurisdiction_id,
        status,
        entities: extraction.bag,
        violations: evaluation.violations,
        totals: evaluation.totals,
        rules_evaluated: evaluation.rules_evaluated,
        skipped: evaluation.skipped,
        reference_namespace: namespace.as_str().to_string(),
        processed_at,
        duration_ms,
    });
    result.errors = errors;
    result
}

/// Storage key and jurisdiction key for one input.
///
/// A filename resolves to the jurisdiction id; an explicit call id doubles
/// as one when no filename was given; with neither, a generated
/// `GEN-2024-XXXXXX` id keeps resolution total.
fn resolve_ids(input: &CallInput) -> (String, String) {
    let jurisdiction_id = match (&input.filename, &input.call_id) {
        (Some(filename), _) => resolve_call_id(filename),
        (None, Some(call_id)) => call_id.clone(),
        (None, None) => generated_call_id(),
    };
    let call_id = input
        .call_id
        .clone()
        .unwrap_or_else(|| jurisdiction_id.clone());
    (call_id, jurisdiction_id)
}

fn generated_call_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("GEN-2024-{}", hex[..6].to_uppercase())
}

fn emit_evaluation_events(
    runtime: &HarkRuntime,
    call_id: &str,
    evaluation: &TranscriptEvaluation,
    duration_ms: u64,
) {
    for skipped in &evaluation.skipped {
        runtime.dispatcher.emit_rule_skipped(&RuleSkippedEvent {
            rule_id: skipped.rule_id.clone(),
            message: skipped.message.clone(),
        });
    }
    for violation in &evaluation.violations {
        runtime
            .dispatcher
            .emit_violation_detected(&ViolationDetectedEvent {
                call_id: call_id.to_string(),
                rule_id: violation.rule_code.clone(),
                severity: violation.severity.as_str().to_string(),
            });
    }
    runtime
        .dispatcher
        .emit_evaluation_completed(&EvaluationCompletedEvent {
            call_id: call_id.to_string(),
            violation_count: evaluation.totals.total,
            manual_review_count: evaluation.totals.manual_review,
            duration_ms,
        });
}

fn persist_completed(
    runtime: &HarkRuntime,
    call_id: &str,
    transcript: &str,
    bag: &EntityBag,
    violations: &[ViolationRecord],
    processed_at: i64,
) -> Result<(), StorageError> {
    let entities_json = serde_json::to_string(bag).map_err(|e| StorageError::SqliteError {
        message: format!("serialize entity bag for {call_id}: {e}"),
    })?;
    runtime.db.with_writer(|conn| {
        with_immediate_transaction(conn, |tx| {
            let changed = calls::mark_completed(tx, call_id, transcript, &entities_json, processed_at)?;
            if !changed {
                return Err(StorageError::SqliteError {
                    message: format!("call {call_id} has no record to complete"),
                });
            }
            calls::insert_violations(tx, violations, processed_at)
        })
    })
}

fn mark_failed_degraded(runtime: &HarkRuntime, call_id: &str, message: &str, processed_at: i64) {
    let marked = runtime
        .db
        .with_writer(|conn| calls::mark_failed(conn, call_id, message, processed_at));
    if let Err(e) = marked {
        error!(call_id = %call_id, error = %e, "failed mark also failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_input_resolves_jurisdiction_from_name() {
        let input = CallInput::from_file("voicemail_1_VM_2024_000123.wav", "hello");
        let (call_id, jurisdiction_id) = resolve_ids(&input);
        assert_eq!(jurisdiction_id, "VM-2024-000123");
        assert_eq!(call_id, "VM-2024-000123");
    }

    #[test]
    fn test_explicit_call_id_wins_as_storage_key() {
        let input = CallInput {
            filename: Some("agent_call_7_GEN_2024_000456.wav".to_string()),
            call_id: Some("ticket-88".to_string()),
            transcript: "hello".to_string(),
        };
        let (call_id, jurisdiction_id) = resolve_ids(&input);
        assert_eq!(call_id, "ticket-88");
        assert_eq!(jurisdiction_id, "GEN-2024-000456");
    }

    #[test]
    fn test_bare_transcript_gets_generated_id() {
        let input = CallInput {
            transcript: "hello".to_string(),
            ..CallInput::default()
        };
        let (call_id, jurisdiction_id) = resolve_ids(&input);
        assert_eq!(call_id, jurisdiction_id);
        assert!(call_id.starts_with("GEN-2024-"));
        assert_eq!(call_id.len(), "GEN-2024-".len() + 6);
        assert!(call_id["GEN-2024-".len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_generated_ids_differ_between_calls() {
        assert_ne!(generated_call_id(), generated_call_id());
    }
}
