//! Compiled PII detection patterns shared by extraction and rule evaluation.

use hark_core::errors::EvaluationError;
use regex::Regex;

/// One detector: compiled pattern, PII kind label, and the confidence
/// assigned to a hit. `numeric` marks the spoken-number families that
/// rule evaluation acts on; non-numeric kinds feed extraction only.
struct PiiRule {
    pattern: Regex,
    kind: &'static str,
    confidence: f64,
    numeric: bool,
}

/// A PII hit with the matched text span.
#[derive(Debug, Clone, PartialEq)]
pub struct PiiHit {
    pub text: String,
    pub kind: &'static str,
    pub confidence: f64,
}

pub struct PiiPatternSet {
    rules: Vec<PiiRule>,
}

impl PiiPatternSet {
    pub fn new() -> Result<Self, EvaluationError> {
        let specs: [(&str, &str, f64, bool); 5] = [
            (r"\b\d{3}-\d{2}-\d{4}\b", "SSN", 0.97, true),
            (r"\b\d{4}[- ]?\d{4}[- ]?\d{4}[- ]?\d{4}\b", "CREDIT_DEBIT_NUMBER", 0.95, true),
            (r"(?i)\baccount(?:\s+number)?\s*#?\s*\d{6,}\b", "BANK_ACCOUNT_NUMBER", 0.90, true),
            (r"\b\(?\d{3}\)?[-. ]\d{3}[-. ]\d{4}\b", "PHONE", 0.85, true),
            (
                r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
                "EMAIL",
                0.92,
                false,
            ),
        ];
        let mut rules = Vec::with_capacity(specs.len());
        for (pattern, kind, confidence, numeric) in specs {
            let compiled = Regex::new(pattern).map_err(|e| EvaluationError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
            rules.push(PiiRule {
                pattern: compiled,
                kind,
                confidence,
                numeric,
            });
        }
        Ok(Self { rules })
    }

    /// All PII spans in `text`. A span already claimed by an earlier rule is
    /// not reported again, so a card number does not double as a phone hit.
    pub fn scan(&self, text: &str) -> Vec<PiiHit> {
        let mut hits: Vec<PiiHit> = Vec::new();
        let mut claimed: Vec<(usize, usize)> = Vec::new();
        for rule in &self.rules {
            for mat in rule.pattern.find_iter(text) {
                let overlaps = claimed
                    .iter()
                    .any(|&(start, end)| mat.start() < end && start < mat.end());
                if overlaps {
                    continue;
                }
                claimed.push((mat.start(), mat.end()));
                hits.push(PiiHit {
                    text: mat.as_str().to_string(),
                    kind: rule.kind,
                    confidence: rule.confidence,
                });
            }
        }
        hits
    }

    /// The kind of the first spoken-number PII span found, if any. Email
    /// addresses are reported by [`Self::scan`] but never counted here.
    pub fn first_numeric_kind(&self, text: &str) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|rule| rule.numeric && rule.pattern.is_match(text))
            .map(|rule| rule.kind)
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.rules.iter().any(|rule| rule.pattern.is_match(text))
    }
}
