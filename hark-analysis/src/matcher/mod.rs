//! Regex pattern matching, transcript windowing, and condition gating.

use std::borrow::Cow;
use std::sync::Arc;

use hark_core::errors::EvaluationError;
use hark_core::types::{ConditionMap, ConditionValue, FieldValue, ReferenceRecord, TimeWindow};
use moka::sync::Cache;
use regex::{Regex, RegexBuilder};

/// Compiles rule patterns case-insensitively and caches the results.
///
/// The same catalog patterns are applied to every transcript; the cache is
/// bounded and keyed by the pattern source.
pub struct PatternMatcher {
    cache: Cache<String, Arc<Regex>>,
}

impl PatternMatcher {
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::new(capacity),
        }
    }

    /// Compiled form of `pattern`, from cache when possible. An invalid
    /// pattern is an error on every call, never a silent non-match.
    pub fn compile(&self, pattern: &str) -> Result<Arc<Regex>, EvaluationError> {
        if let Some(hit) = self.cache.get(pattern) {
            return Ok(hit);
        }
        let compiled = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| EvaluationError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
        let shared = Arc::new(compiled);
        self.cache.insert(pattern.to_string(), Arc::clone(&shared));
        Ok(shared)
    }

    /// True when any pattern in the list matches `text`.
    pub fn any_found(&self, text: &str, patterns: &[String]) -> Result<bool, EvaluationError> {
        for pattern in patterns {
            if self.compile(pattern)?.is_match(text) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// The subset of patterns that match, preserving catalog order.
    pub fn matched<'a>(
        &self,
        text: &str,
        patterns: &'a [String],
    ) -> Result<Vec<&'a str>, EvaluationError> {
        let mut found = Vec::new();
        for pattern in patterns {
            if self.compile(pattern)?.is_match(text) {
                found.push(pattern.as_str());
            }
        }
        Ok(found)
    }
}

/// Restricts `text` to the rule's evaluation window.
///
/// The opening window is approximated as the first `opening_words` words of
/// the transcript, rejoined with single spaces. Full-call rules borrow the
/// original text untouched.
pub fn windowed(text: &str, window: TimeWindow, opening_words: usize) -> Cow<'_, str> {
    match window {
        TimeWindow::FullCall => Cow::Borrowed(text),
        TimeWindow::FirstSixtySeconds => {
            let opening: Vec<&str> = text.split_whitespace().take(opening_words).collect();
            Cow::Owned(opening.join(" "))
        }
    }
}

/// Evaluates a rule condition against the reference record.
///
/// Every key must be satisfied for the gate to open. An unknown field name
/// fails its clause rather than erroring.
pub fn condition_met(reference: &ReferenceRecord, condition: &ConditionMap) -> bool {
    condition.iter().all(|(key, expected)| {
        let Some(actual) = reference.field(key) else {
            tracing::debug!(field = %key, "condition references unknown field");
            return false;
        };
        match (actual, expected) {
            (FieldValue::Bool(actual), ConditionValue::Bool(expected)) => actual == *expected,
            (FieldValue::Text(actual), ConditionValue::Text(expected)) => actual == expected,
            (FieldValue::Text(actual), ConditionValue::List(options)) => {
                options.iter().any(|option| option == actual)
            }
            _ => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn matcher() -> PatternMatcher {
        PatternMatcher::new(64)
    }

    #[test]
    fn test_patterns_match_case_insensitively() {
        let m = matcher();
        let patterns = vec![r"this call is being recorded".to_string()];
        assert!(m
            .any_found("THIS CALL IS BEING RECORDED for training.", &patterns)
            .unwrap());
        assert!(!m.any_found("Good afternoon.", &patterns).unwrap());
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let m = matcher();
        let patterns = vec![r"(unclosed".to_string()];
        let err = m.any_found("anything", &patterns).unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidPattern { .. }));
    }

    #[test]
    fn test_compiled_pattern_is_cached() {
        let m = matcher();
        let first = m.compile(r"\bdebt\b").unwrap();
        let second = m.compile(r"\bdebt\b").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_matched_preserves_catalog_order() {
        let m = matcher();
        let patterns = vec![
            r"debt collector".to_string(),
            r"no such phrase".to_string(),
            r"being recorded".to_string(),
        ];
        let found = m
            .matched("This call is being recorded. I am a debt collector.", &patterns)
            .unwrap();
        assert_eq!(found, vec!["debt collector", "being recorded"]);
    }

    #[test]
    fn test_opening_window_takes_first_words() {
        let text = "one two three four five six";
        assert_eq!(
            windowed(text, TimeWindow::FirstSixtySeconds, 4),
            "one two three four"
        );
        assert_eq!(windowed(text, TimeWindow::FullCall, 4), text);
    }

    #[test]
    fn test_opening_window_rejoins_with_single_spaces() {
        let text = "one   two\n\nthree\tfour five";
        assert_eq!(
            windowed(text, TimeWindow::FirstSixtySeconds, 3),
            "one two three"
        );
    }

    #[test]
    fn test_condition_requires_every_key() {
        let mut reference = ReferenceRecord::fallback();
        reference.do_not_call = true;
        reference.customer_state = "TX".to_string();

        let mut condition: ConditionMap = FxHashMap::default();
        condition.insert("do_not_call".to_string(), ConditionValue::Bool(true));
        condition.insert("state".to_string(), ConditionValue::Text("TX".to_string()));
        assert!(condition_met(&reference, &condition));

        condition.insert("state".to_string(), ConditionValue::Text("MA".to_string()));
        assert!(!condition_met(&reference, &condition));
    }

    #[test]
    fn test_condition_list_membership() {
        let mut reference = ReferenceRecord::fallback();
        reference.customer_state = "MA".to_string();

        let mut condition: ConditionMap = FxHashMap::default();
        condition.insert(
            "state".to_string(),
            ConditionValue::List(vec!["MA".to_string(), "NY".to_string()]),
        );
        assert!(condition_met(&reference, &condition));

        reference.customer_state = "TX".to_string();
        assert!(!condition_met(&reference, &condition));
    }

    #[test]
    fn test_unknown_field_fails_the_gate() {
        let reference = ReferenceRecord::fallback();
        let mut condition: ConditionMap = FxHashMap::default();
        condition.insert("no_such_field".to_string(), ConditionValue::Bool(true));
        assert!(!condition_met(&reference, &condition));
    }

    #[test]
    fn test_empty_condition_is_open() {
        let reference = ReferenceRecord::fallback();
        let condition: ConditionMap = FxHashMap::default();
        assert!(condition_met(&reference, &condition));
    }

    #[test]
    fn test_type_mismatch_fails_the_clause() {
        let mut reference = ReferenceRecord::fallback();
        reference.attorney_retained = true;
        let mut condition: ConditionMap = FxHashMap::default();
        condition.insert(
            "attorney_retained".to_string(),
            ConditionValue::Text("true".to_string()),
        );
        assert!(!condition_met(&reference, &condition));
    }
}
