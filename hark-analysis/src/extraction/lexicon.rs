//! Built-in lexicon-based entity recognizer.
//!
//! Stands in for a hosted NLP service: capitalization heuristics for people
//! and organizations, the state-name vocabulary for locations, clause
//! splitting for key phrases, and the shared PII pattern set. Confidences are
//! fixed per heuristic so downstream thresholding stays deterministic.

use hark_core::errors::ExtractionError;
use hark_core::traits::{
    ChunkAnalysis, EntityKind, EntityRecognizer, RecognizedEntity, RecognizedPhrase, RecognizedPii,
};
use regex::Regex;

use crate::pii_patterns::PiiPatternSet;
use crate::vocab;

/// Leading words that start a sentence far more often than a name.
const NAME_STOPWORDS: &[&str] = &[
    "The", "This", "That", "Good", "Hello", "Thank", "Thanks", "Please", "Your", "Our", "Dear",
    "Have", "After", "Before", "When", "While",
];

/// A capitalized bigram ending in one of these is a company, not a person.
const ORG_SUFFIXES: &[&str] = &[
    "Servicing",
    "Financial",
    "Bank",
    "Collections",
    "Agency",
    "Associates",
    "Group",
    "Solutions",
    "Recovery",
    "Inc",
    "LLC",
];

const HONORIFIC_CONFIDENCE: f64 = 0.93;
const FULL_NAME_CONFIDENCE: f64 = 0.82;
const CUE_FULL_NAME_CONFIDENCE: f64 = 0.92;
const CUE_SINGLE_NAME_CONFIDENCE: f64 = 0.75;
const ORGANIZATION_CONFIDENCE: f64 = 0.88;
const LOCATION_CONFIDENCE: f64 = 0.90;
const PHRASE_CONFIDENCE: f64 = 0.85;
const NUMERIC_PHRASE_CONFIDENCE: f64 = 0.92;

pub struct LexiconRecognizer {
    honorific: Regex,
    full_name: Regex,
    cue_name: Regex,
    organization: Regex,
    pii: PiiPatternSet,
}

impl LexiconRecognizer {
    pub fn new() -> Result<Self, ExtractionError> {
        Ok(Self {
            honorific: compile(r"\b(?:Mr|Mrs|Ms|Dr)\.?\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?\b")?,
            full_name: compile(r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b")?,
            cue_name: compile(
                r"\b(?:[Tt]his is|[Mm]y name is|[Ii] am|[Ii]'m)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)\b",
            )?,
            organization: compile(
                r"\b(?:[A-Z][A-Za-z&'-]*\s+){1,3}(?:Servicing|Financial|Bank|Collections|Agency|Associates|Group|Solutions|Recovery|Inc|LLC)\b",
            )?,
            pii: PiiPatternSet::new()
                .map_err(|e| ExtractionError::RecognizerFailure(e.to_string()))?,
        })
    }

    fn recognize_persons(&self, chunk: &str, out: &mut Vec<RecognizedEntity>) {
        for mat in self.honorific.find_iter(chunk) {
            push_entity(out, mat.as_str(), HONORIFIC_CONFIDENCE, EntityKind::Person);
        }
        for cap in self.cue_name.captures_iter(chunk) {
            if let Some(name) = cap.get(1) {
                let confidence = if name.as_str().contains(' ') {
                    CUE_FULL_NAME_CONFIDENCE
                } else {
                    CUE_SINGLE_NAME_CONFIDENCE
                };
                push_entity(out, name.as_str(), confidence, EntityKind::Person);
            }
        }
        for mat in self.full_name.find_iter(chunk) {
            if plausible_person(mat.as_str()) {
                push_entity(out, mat.as_str(), FULL_NAME_CONFIDENCE, EntityKind::Person);
            }
        }
    }

    fn recognize_organizations(&self, chunk: &str, out: &mut Vec<RecognizedEntity>) {
        for mat in self.organization.find_iter(chunk) {
            push_entity(
                out,
                mat.as_str().trim_end_matches('.'),
                ORGANIZATION_CONFIDENCE,
                EntityKind::Organization,
            );
        }
    }

    fn recognize_locations(&self, chunk: &str, out: &mut Vec<RecognizedEntity>) {
        for (start, end) in vocab::geographic().find_spans(chunk) {
            push_entity(out, &chunk[start..end], LOCATION_CONFIDENCE, EntityKind::Location);
        }
    }

    fn extract_key_phrases(&self, chunk: &str) -> Vec<RecognizedPhrase> {
        let mut phrases = Vec::new();
        for clause in chunk.split(['.', '?', '!', ';', ',', ':']) {
            let clause = clause.trim();
            let words = clause.split_whitespace().count();
            if !(2..=20).contains(&words) {
                continue;
            }
            let confidence = if clause.contains('$') || clause.chars().any(|c| c.is_ascii_digit())
            {
                NUMERIC_PHRASE_CONFIDENCE
            } else {
                PHRASE_CONFIDENCE
            };
            phrases.push(RecognizedPhrase {
                text: clause.to_string(),
                confidence,
            });
        }
        phrases
    }
}

impl EntityRecognizer for LexiconRecognizer {
    fn analyze(&self, chunk: &str) -> Result<ChunkAnalysis, ExtractionError> {
        let mut entities = Vec::new();
        self.recognize_persons(chunk, &mut entities);
        self.recognize_organizations(chunk, &mut entities);
        self.recognize_locations(chunk, &mut entities);

        let pii = self
            .pii
            .scan(chunk)
            .into_iter()
            .map(|hit| RecognizedPii {
                text: hit.text,
                confidence: hit.confidence,
                kind: hit.kind.to_string(),
            })
            .collect();

        Ok(ChunkAnalysis {
            entities,
            key_phrases: self.extract_key_phrases(chunk),
            pii,
        })
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

fn compile(pattern: &str) -> Result<Regex, ExtractionError> {
    Regex::new(pattern).map_err(|e| ExtractionError::RecognizerFailure(e.to_string()))
}

/// Filters capitalized bigrams that are really sentence openers, state
/// names, or company names.
fn plausible_person(bigram: &str) -> bool {
    let mut tokens = bigram.split_whitespace();
    let (Some(first), Some(second)) = (tokens.next(), tokens.next()) else {
        return false;
    };
    if NAME_STOPWORDS.contains(&first) || NAME_STOPWORDS.contains(&second) {
        return false;
    }
    if ORG_SUFFIXES.contains(&second) {
        return false;
    }
    !vocab::STATE_NAMES.contains(&bigram.to_lowercase().as_str())
}

/// Appends an entity, deduplicating case-insensitively and keeping the
/// highest confidence seen for a given text and kind.
fn push_entity(out: &mut Vec<RecognizedEntity>, text: &str, confidence: f64, kind: EntityKind) {
    let lowered = text.to_lowercase();
    if let Some(existing) = out
        .iter_mut()
        .find(|e| e.kind == kind && e.text.to_lowercase() == lowered)
    {
        if confidence > existing.confidence {
            existing.confidence = confidence;
        }
        return;
    }
    out.push(RecognizedEntity {
        text: text.to_string(),
        confidence,
        kind,
    });
}
