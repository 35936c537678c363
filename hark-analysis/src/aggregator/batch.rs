//! Parallel rule sweeps over a batch of calls.

use chrono::{DateTime, Local};
use hark_core::types::{EntityBag, ReferenceRecord, Rule};
use rayon::prelude::*;

use super::{evaluate_transcript, TranscriptEvaluation};
use crate::evaluator::RuleEvaluator;

/// One call's inputs for a batch sweep.
#[derive(Debug, Clone)]
pub struct BatchCall {
    pub call_id: String,
    pub transcript: String,
    pub entities: EntityBag,
    pub reference: ReferenceRecord,
}

/// Sweeps the rule set over every call in parallel.
///
/// Output order matches input order, and each call is evaluated in
/// isolation, so a batch run and a sequential loop agree result for result.
pub fn evaluate_batch(
    evaluator: &RuleEvaluator,
    rules: &[Rule],
    calls: &[BatchCall],
    at: DateTime<Local>,
) -> Vec<TranscriptEvaluation> {
    calls
        .par_iter()
        .map(|call| {
            evaluate_transcript(
                evaluator,
                rules,
                &call.call_id,
                &call.transcript,
                &call.entities,
                &call.reference,
                at,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::test_support::pattern_rule;
    use chrono::TimeZone;
    use hark_core::config::EvaluationConfig;
    use hark_core::types::TimeWindow;

    #[test]
    fn test_batch_matches_sequential_results() {
        let evaluator = RuleEvaluator::new(&EvaluationConfig::default()).unwrap();
        let rules = vec![pattern_rule(
            "LO1001.01",
            &["this is"],
            true,
            TimeWindow::FullCall,
        )];
        let at = Local.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();
        let calls: Vec<BatchCall> = (0..16)
            .map(|i| BatchCall {
                call_id: format!("GEN-2024-{i:06}"),
                transcript: if i % 2 == 0 {
                    "Hello, this is John Smith.".to_string()
                } else {
                    "No identification happened.".to_string()
                },
                entities: EntityBag::new(),
                reference: ReferenceRecord::fallback(),
            })
            .collect();

        let parallel = evaluate_batch(&evaluator, &rules, &calls, at);
        assert_eq!(parallel.len(), calls.len());
        for (call, outcome) in calls.iter().zip(&parallel) {
            let sequential = evaluate_transcript(
                &evaluator,
                &rules,
                &call.call_id,
                &call.transcript,
                &call.entities,
                &call.reference,
                at,
            );
            assert_eq!(outcome.violations, sequential.violations);
        }
        // Odd-indexed calls violate the identification rule.
        assert_eq!(
            parallel.iter().filter(|o| !o.violations.is_empty()).count(),
            8
        );
    }
}
