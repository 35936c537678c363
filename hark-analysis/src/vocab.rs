//! Fixed vocabularies for phrase bucketing and sentiment checks.
//!
//! Every list is compiled in. The scanner never learns terms at runtime;
//! changing a vocabulary is a code change.

use std::sync::OnceLock;

use aho_corasick::AhoCorasick;
use hark_core::types::EntityCategory;

/// Terms that route a key phrase into the `financial` bucket.
pub const FINANCIAL_TERMS: &[&str] = &["dollar", "payment", "amount", "balance", "account", "owe"];

pub const MEDICAL_TERMS: &[&str] = &[
    "medical",
    "hospital",
    "doctor",
    "surgery",
    "illness",
    "medication",
];

pub const LEGAL_TERMS: &[&str] = &[
    "attorney",
    "lawyer",
    "bankruptcy",
    "legal action",
    "cease and desist",
];

pub const COMMUNICATION_TERMS: &[&str] = &["text message", "sms", "email", "voicemail", "call back"];

/// Collection-pressure language. Kept separate from [`LEGAL_TERMS`] so that
/// threat phrasing lands in the `threatening` bucket even though the words
/// overlap the legal domain.
pub const THREATENING_TERMS: &[&str] = &[
    "garnish",
    "repossess",
    "arrest",
    "jail",
    "seize",
    "take you to court",
    "sue you",
];

pub const PROFANITY_TERMS: &[&str] = &[
    "damn",
    "hell",
    "crap",
    "bastard",
    "bitch",
    "asshole",
    "shut up",
    "idiot",
    "stupid",
    "screw you",
];

/// Phrases that signal impersonation of courts, law enforcement, or
/// government agencies on a collection call.
pub const FRAUD_TERMS: &[&str] = &[
    "i am an attorney",
    "calling from the court",
    "calling from the irs",
    "you have been sued",
    "federal agent",
    "law enforcement",
    "credit bureau official",
    "guaranteed to remove",
];

pub const COMPLIANCE_DISCLOSURE_TERMS: &[&str] = &[
    "call is being recorded",
    "recorded for quality",
    "attempt to collect a debt",
    "information obtained will be used for that purpose",
    "communication is from a debt collector",
];

pub const AGENT_IDENTIFICATION_TERMS: &[&str] = &[
    "my name is",
    "this is",
    "calling from",
    "calling on behalf of",
];

pub const TIMING_SENSITIVE_TERMS: &[&str] = &[
    "immediately",
    "right now",
    "today",
    "within 24 hours",
    "final notice",
    "deadline",
];

/// Signals that the call reached a voicemail box rather than a person.
pub const VOICEMAIL_TERMS: &[&str] = &[
    "voicemail",
    "leave a message",
    "after the tone",
    "message for",
    "not available",
];

pub const STATE_NAMES: &[&str] = &[
    "alabama",
    "alaska",
    "arizona",
    "arkansas",
    "california",
    "colorado",
    "connecticut",
    "delaware",
    "florida",
    "georgia",
    "hawaii",
    "idaho",
    "illinois",
    "indiana",
    "iowa",
    "kansas",
    "kentucky",
    "louisiana",
    "maine",
    "maryland",
    "massachusetts",
    "michigan",
    "minnesota",
    "mississippi",
    "missouri",
    "montana",
    "nebraska",
    "nevada",
    "new hampshire",
    "new jersey",
    "new mexico",
    "new york",
    "north carolina",
    "north dakota",
    "ohio",
    "oklahoma",
    "oregon",
    "pennsylvania",
    "rhode island",
    "south carolina",
    "south dakota",
    "tennessee",
    "texas",
    "utah",
    "vermont",
    "virginia",
    "washington",
    "west virginia",
    "wisconsin",
    "wyoming",
];

/// Case-insensitive multi-term scanner with word-boundary filtering.
///
/// Raw Aho-Corasick matching is substring matching, which turns "hell" into a
/// hit on "hello" and "ass" into a hit on "assistance". Every match is
/// therefore checked against its neighbouring characters before it counts.
pub struct VocabularyMatcher {
    automaton: Option<AhoCorasick>,
    terms: &'static [&'static str],
}

impl VocabularyMatcher {
    pub fn new(terms: &'static [&'static str]) -> Self {
        let automaton = match AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(terms)
        {
            Ok(automaton) => Some(automaton),
            Err(e) => {
                // Build failure degrades to a matcher that finds nothing.
                tracing::error!(error = %e, "vocabulary automaton failed to build");
                None
            }
        };
        Self { automaton, terms }
    }

    pub fn terms(&self) -> &'static [&'static str] {
        self.terms
    }

    /// True when at least one term occurs in `text` on a word boundary.
    pub fn is_match(&self, text: &str) -> bool {
        let Some(automaton) = &self.automaton else {
            return false;
        };
        automaton
            .find_iter(text)
            .any(|mat| on_word_boundary(text, mat.start(), mat.end()))
    }

    /// Byte spans of every boundary-valid match, in text order.
    pub fn find_spans(&self, text: &str) -> Vec<(usize, usize)> {
        let Some(automaton) = &self.automaton else {
            return Vec::new();
        };
        automaton
            .find_iter(text)
            .filter(|mat| on_word_boundary(text, mat.start(), mat.end()))
            .map(|mat| (mat.start(), mat.end()))
            .collect()
    }

    /// All distinct vocabulary terms present in `text`, in first-hit order.
    pub fn find_terms(&self, text: &str) -> Vec<&'static str> {
        let Some(automaton) = &self.automaton else {
            return Vec::new();
        };
        let mut hits = Vec::new();
        for mat in automaton.find_iter(text) {
            if !on_word_boundary(text, mat.start(), mat.end()) {
                continue;
            }
            let term = self.terms[mat.pattern().as_usize()];
            if !hits.contains(&term) {
                hits.push(term);
            }
        }
        hits
    }
}

fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(|c| c.is_alphanumeric()) && !after.is_some_and(|c| c.is_alphanumeric())
}

macro_rules! vocab_accessor {
    ($name:ident, $terms:expr) => {
        pub fn $name() -> &'static VocabularyMatcher {
            static MATCHER: OnceLock<VocabularyMatcher> = OnceLock::new();
            MATCHER.get_or_init(|| VocabularyMatcher::new($terms))
        }
    };
}

vocab_accessor!(financial, FINANCIAL_TERMS);
vocab_accessor!(medical, MEDICAL_TERMS);
vocab_accessor!(legal, LEGAL_TERMS);
vocab_accessor!(communication, COMMUNICATION_TERMS);
vocab_accessor!(threatening, THREATENING_TERMS);
vocab_accessor!(profanity, PROFANITY_TERMS);
vocab_accessor!(fraud, FRAUD_TERMS);
vocab_accessor!(compliance_disclosures, COMPLIANCE_DISCLOSURE_TERMS);
vocab_accessor!(agent_identification, AGENT_IDENTIFICATION_TERMS);
vocab_accessor!(timing_sensitive, TIMING_SENSITIVE_TERMS);
vocab_accessor!(voicemail, VOICEMAIL_TERMS);
vocab_accessor!(geographic, STATE_NAMES);

/// Bucket routing for extracted key phrases. Order matters: the first
/// matching bucket wins, so a phrase naming both a payment and a lawyer
/// lands in `financial`.
pub fn bucket_chain() -> &'static [(EntityCategory, &'static VocabularyMatcher)] {
    static CHAIN: OnceLock<Vec<(EntityCategory, &'static VocabularyMatcher)>> = OnceLock::new();
    CHAIN.get_or_init(|| {
        vec![
            (EntityCategory::Financial, financial()),
            (EntityCategory::Medical, medical()),
            (EntityCategory::Legal, legal()),
            (EntityCategory::Communication, communication()),
            (EntityCategory::Threatening, threatening()),
            (EntityCategory::Geographic, geographic()),
            (EntityCategory::ComplianceDisclosures, compliance_disclosures()),
            (EntityCategory::AgentIdentification, agent_identification()),
            (EntityCategory::TimingSensitive, timing_sensitive()),
        ]
    })
}

/// The first bucket whose vocabulary matches the phrase, if any.
pub fn bucket_for_phrase(phrase: &str) -> Option<EntityCategory> {
    bucket_chain()
        .iter()
        .find(|(_, matcher)| matcher.is_match(phrase))
        .map(|(category, _)| *category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_filtering_rejects_substrings() {
        let matcher = profanity();
        assert!(!matcher.is_match("Hello, this is John Smith."));
        assert!(!matcher.is_match("We appreciate your assistance and your class."));
        assert!(matcher.is_match("What the hell is this charge?"));
    }

    #[test]
    fn test_case_insensitive_match() {
        assert!(threatening().is_match("We will GARNISH your wages."));
        assert!(threatening().is_match("we may seize the vehicle"));
    }

    #[test]
    fn test_find_terms_dedupes_in_first_hit_order() {
        let hits = threatening().find_terms("We can garnish wages, garnish accounts, or seize assets.");
        assert_eq!(hits, vec!["garnish", "seize"]);
    }

    #[test]
    fn test_multi_word_terms() {
        assert!(legal().is_match("we will pursue legal action against you"));
        assert!(fraud().is_match("I'm calling from the IRS about your file"));
    }

    #[test]
    fn test_bucket_order_first_match_wins() {
        assert_eq!(
            bucket_for_phrase("a payment plan with your attorney"),
            Some(EntityCategory::Financial)
        );
        assert_eq!(
            bucket_for_phrase("your attorney has been notified"),
            Some(EntityCategory::Legal)
        );
        assert_eq!(
            bucket_for_phrase("we will garnish your wages"),
            Some(EntityCategory::Threatening)
        );
        assert_eq!(bucket_for_phrase("the weather is nice"), None);
    }

    #[test]
    fn test_state_names_route_to_geographic() {
        assert_eq!(
            bucket_for_phrase("our office in North Carolina"),
            Some(EntityCategory::Geographic)
        );
    }
}
