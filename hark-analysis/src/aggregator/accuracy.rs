//! Detection accuracy against expected violations.
//!
//! Reference records can carry the rule ids a reviewed call is known to
//! violate. Comparing detections against that ground truth gives per-call
//! precision and recall for catalog tuning.

use hark_core::types::ViolationRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyReport {
    pub expected: Vec<String>,
    pub detected: Vec<String>,
    pub matched: Vec<String>,
    pub missed: Vec<String>,
    pub unexpected: Vec<String>,
    pub precision: f64,
    pub recall: f64,
}

/// Scores detected violations against the expected rule ids.
///
/// Both sides are deduplicated: firing a rule twice neither helps nor hurts.
/// An empty side scores 1.0 for its ratio, so a clean call with no
/// expectations is perfect rather than undefined.
pub fn score_against_expected(
    expected: &[String],
    violations: &[ViolationRecord],
) -> AccuracyReport {
    let expected = dedup(expected.iter().map(String::as_str));
    let detected = dedup(violations.iter().map(|v| v.rule_code.as_str()));

    let matched: Vec<String> = expected
        .iter()
        .filter(|rule_id| detected.contains(rule_id))
        .cloned()
        .collect();
    let missed: Vec<String> = expected
        .iter()
        .filter(|rule_id| !detected.contains(rule_id))
        .cloned()
        .collect();
    let unexpected: Vec<String> = detected
        .iter()
        .filter(|rule_id| !expected.contains(rule_id))
        .cloned()
        .collect();

    let precision = ratio(matched.len(), detected.len());
    let recall = ratio(matched.len(), expected.len());
    AccuracyReport {
        expected,
        detected,
        matched,
        missed,
        unexpected,
        precision,
        recall,
    }
}

fn dedup<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.iter().any(|s: &String| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        1.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hark_core::types::{RuleCategory, Severity};

    fn violation(rule_code: &str) -> ViolationRecord {
        ViolationRecord {
            date: "06/01/2024 09:30:00 AM".to_string(),
            severity: Severity::Major,
            code: RuleCategory::Policy,
            rule_code: rule_code.to_string(),
            comment: String::new(),
            call_id: "GEN-2024-000001".to_string(),
            ai_confidence: 1.0,
            extraction_quality: 1.0,
            evidence: Vec::new(),
            low_confidence_entities: Vec::new(),
            requires_manual_review: false,
        }
    }

    fn expected(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_perfect_detection() {
        let report = score_against_expected(
            &expected(&["LO1001.01", "LO1007.05"]),
            &[violation("LO1001.01"), violation("LO1007.05")],
        );
        assert_eq!(report.matched.len(), 2);
        assert!(report.missed.is_empty());
        assert!(report.unexpected.is_empty());
        assert_eq!(report.precision, 1.0);
        assert_eq!(report.recall, 1.0);
    }

    #[test]
    fn test_misses_and_false_positives() {
        let report = score_against_expected(
            &expected(&["LO1001.01", "LO1005.01"]),
            &[violation("LO1001.01"), violation("LO1008.01")],
        );
        assert_eq!(report.matched, vec!["LO1001.01"]);
        assert_eq!(report.missed, vec!["LO1005.01"]);
        assert_eq!(report.unexpected, vec!["LO1008.01"]);
        assert_eq!(report.precision, 0.5);
        assert_eq!(report.recall, 0.5);
    }

    #[test]
    fn test_duplicate_detections_count_once() {
        let report = score_against_expected(
            &expected(&["LO1001.01"]),
            &[violation("LO1001.01"), violation("LO1001.01")],
        );
        assert_eq!(report.detected, vec!["LO1001.01"]);
        assert_eq!(report.precision, 1.0);
        assert_eq!(report.recall, 1.0);
    }

    #[test]
    fn test_empty_sides_are_perfect() {
        let report = score_against_expected(&[], &[]);
        assert_eq!(report.precision, 1.0);
        assert_eq!(report.recall, 1.0);

        let report = score_against_expected(&[], &[violation("LO1001.01")]);
        assert_eq!(report.precision, 0.0);
        assert_eq!(report.recall, 1.0);

        let report = score_against_expected(&expected(&["LO1001.01"]), &[]);
        assert_eq!(report.precision, 1.0);
        assert_eq!(report.recall, 0.0);
    }
}
