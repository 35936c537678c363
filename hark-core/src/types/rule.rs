//! Compliance rules and their typed evaluation logic.
//!
//! Rule definitions arrive as permissive data (`RuleDef` / `RuleLogicDef`,
//! straight from TOML or stored JSON) and are compiled into the typed
//! [`RuleLogic`] union. Compilation is where malformed definitions are
//! rejected, one rule at a time, so a bad definition can never take down a
//! whole evaluation sweep.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::errors::EvaluationError;
use crate::types::entity::EntityCategory;

/// Rule category, persisted as the violation `code` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    Identification,
    Communication,
    Policy,
    System,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Identification => "identification",
            RuleCategory::Communication => "communication",
            RuleCategory::Policy => "policy",
            RuleCategory::System => "system",
        }
    }

    pub fn parse(name: &str) -> Option<RuleCategory> {
        match name {
            "identification" => Some(RuleCategory::Identification),
            "communication" => Some(RuleCategory::Communication),
            "policy" => Some(RuleCategory::Policy),
            "system" => Some(RuleCategory::System),
            _ => None,
        }
    }
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Violation severity. A label for reporting; it never alters evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Minor => "minor",
            Severity::Major => "major",
            Severity::Critical => "critical",
        }
    }

    pub fn parse(name: &str) -> Option<Severity> {
        match name {
            "minor" => Some(Severity::Minor),
            "major" => Some(Severity::Major),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A condition-map value: scalar equality or list membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

/// Conjunction of reference-field requirements. Empty means trivially true.
pub type ConditionMap = FxHashMap<String, ConditionValue>;

/// Transcript window a pattern rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    FullCall,
    /// Approximated as the first 150 words of the transcript.
    FirstSixtySeconds,
}

impl TimeWindow {
    /// Absent or unrecognized labels mean the full call.
    pub fn from_label(label: Option<&str>) -> TimeWindow {
        match label {
            Some("first_60_seconds") => TimeWindow::FirstSixtySeconds,
            _ => TimeWindow::FullCall,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::FullCall => "full_call",
            TimeWindow::FirstSixtySeconds => "first_60_seconds",
        }
    }
}

/// Named sentiment check backed by a fixed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentimentCheck {
    Profanity,
    ThreateningLanguage,
    FraudulentRepresentation,
}

impl SentimentCheck {
    pub fn parse(check: &str) -> Option<SentimentCheck> {
        match check {
            "profanity" => Some(SentimentCheck::Profanity),
            "threatening_language" | "threatening" => Some(SentimentCheck::ThreateningLanguage),
            "fraudulent_representation" | "fraud_misrepresentation" => {
                Some(SentimentCheck::FraudulentRepresentation)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentCheck::Profanity => "profanity",
            SentimentCheck::ThreateningLanguage => "threatening_language",
            SentimentCheck::FraudulentRepresentation => "fraudulent_representation",
        }
    }
}

/// Discriminator for [`RuleLogic`], used as the strategy registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    PatternMatch,
    ConditionalPattern,
    ReferenceCheck,
    ConditionalReference,
    ReferenceValidation,
    ReferenceMatch,
    SystemCheck,
    Sentiment,
    PiiDetection,
    ComplexValidation,
    Fallback,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::PatternMatch => "pattern_match",
            RuleKind::ConditionalPattern => "pattern_match_conditional",
            RuleKind::ReferenceCheck => "reference_check",
            RuleKind::ConditionalReference => "reference_check_conditional",
            RuleKind::ReferenceValidation => "reference_validation",
            RuleKind::ReferenceMatch => "reference_match",
            RuleKind::SystemCheck => "system_check",
            RuleKind::Sentiment => "sentiment_analysis",
            RuleKind::PiiDetection => "pii_detection",
            RuleKind::ComplexValidation => "complex_validation",
            RuleKind::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short inline pattern list; most rules carry one to three patterns.
pub type PatternList = SmallVec<[String; 4]>;

/// Typed rule logic, one variant per `type` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleLogic {
    PatternMatch {
        patterns: PatternList,
        required: bool,
        window: TimeWindow,
        entity_types: SmallVec<[EntityCategory; 4]>,
    },
    ConditionalPattern {
        condition: ConditionMap,
        patterns: PatternList,
        required: bool,
    },
    ReferenceCheck {
        check: String,
        condition: ConditionMap,
    },
    ConditionalReference {
        condition: ConditionMap,
        patterns: PatternList,
    },
    ReferenceValidation {
        check: String,
    },
    ReferenceMatch {
        check: String,
        context: Option<String>,
    },
    SystemCheck {
        check: String,
    },
    Sentiment {
        check: SentimentCheck,
    },
    PiiDetection,
    ComplexValidation,
    /// Unrecognized `type` tag, evaluated with plain pattern semantics.
    Fallback {
        raw_type: String,
        patterns: PatternList,
        required: bool,
    },
}

impl RuleLogic {
    pub fn kind(&self) -> RuleKind {
        match self {
            RuleLogic::PatternMatch { .. } => RuleKind::PatternMatch,
            RuleLogic::ConditionalPattern { .. } => RuleKind::ConditionalPattern,
            RuleLogic::ReferenceCheck { .. } => RuleKind::ReferenceCheck,
            RuleLogic::ConditionalReference { .. } => RuleKind::ConditionalReference,
            RuleLogic::ReferenceValidation { .. } => RuleKind::ReferenceValidation,
            RuleLogic::ReferenceMatch { .. } => RuleKind::ReferenceMatch,
            RuleLogic::SystemCheck { .. } => RuleKind::SystemCheck,
            RuleLogic::Sentiment { .. } => RuleKind::Sentiment,
            RuleLogic::PiiDetection => RuleKind::PiiDetection,
            RuleLogic::ComplexValidation => RuleKind::ComplexValidation,
            RuleLogic::Fallback { .. } => RuleKind::Fallback,
        }
    }

    /// Compile a permissive definition into typed logic. Rejects
    /// definitions missing the fields their type requires.
    pub fn from_def(def: RuleLogicDef) -> Result<RuleLogic, EvaluationError> {
        let missing = |kind: &str, field: &'static str| EvaluationError::MissingLogicField {
            kind: kind.to_string(),
            field,
        };

        let patterns: PatternList = def.patterns.into_iter().collect();
        let required = def.required.unwrap_or(true);

        match def.logic_type.as_str() {
            "pattern_match" => {
                if patterns.is_empty() {
                    return Err(missing("pattern_match", "patterns"));
                }
                // Unknown entity type names are dropped; a strategy treats
                // them as absent buckets anyway.
                let entity_types = def
                    .entity_types
                    .iter()
                    .filter_map(|name| EntityCategory::parse(name))
                    .collect();
                Ok(RuleLogic::PatternMatch {
                    patterns,
                    required,
                    window: TimeWindow::from_label(def.time_frame.as_deref()),
                    entity_types,
                })
            }
            "pattern_match_conditional" => {
                if def.condition.is_empty() {
                    return Err(missing("pattern_match_conditional", "condition"));
                }
                if patterns.is_empty() {
                    return Err(missing("pattern_match_conditional", "patterns"));
                }
                Ok(RuleLogic::ConditionalPattern {
                    condition: def.condition,
                    patterns,
                    required,
                })
            }
            "reference_check" => {
                let check = def
                    .check
                    .filter(|c| !c.is_empty())
                    .ok_or_else(|| missing("reference_check", "check"))?;
                Ok(RuleLogic::ReferenceCheck {
                    check,
                    condition: def.condition,
                })
            }
            "reference_check_conditional" => {
                if def.condition.is_empty() {
                    return Err(missing("reference_check_conditional", "condition"));
                }
                if patterns.is_empty() {
                    return Err(missing("reference_check_conditional", "patterns"));
                }
                Ok(RuleLogic::ConditionalReference {
                    condition: def.condition,
                    patterns,
                })
            }
            "reference_validation" => Ok(RuleLogic::ReferenceValidation {
                check: def
                    .check
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| "agent_name_traceable".to_string()),
            }),
            "reference_match" => Ok(RuleLogic::ReferenceMatch {
                check: def
                    .check
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| "customer_full_name".to_string()),
                context: def.context,
            }),
            "system_check" => {
                let check = def
                    .check
                    .filter(|c| !c.is_empty())
                    .ok_or_else(|| missing("system_check", "check"))?;
                Ok(RuleLogic::SystemCheck { check })
            }
            "sentiment_analysis" => {
                let check = def
                    .check
                    .filter(|c| !c.is_empty())
                    .ok_or_else(|| missing("sentiment_analysis", "check"))?;
                let parsed = SentimentCheck::parse(&check).ok_or_else(|| {
                    EvaluationError::UnknownCheck {
                        kind: "sentiment_analysis".to_string(),
                        check: check.clone(),
                    }
                })?;
                Ok(RuleLogic::Sentiment { check: parsed })
            }
            "pii_detection" => Ok(RuleLogic::PiiDetection),
            "complex_validation" => Ok(RuleLogic::ComplexValidation),
            other => {
                if patterns.is_empty() {
                    return Err(missing(other, "patterns"));
                }
                Ok(RuleLogic::Fallback {
                    raw_type: other.to_string(),
                    patterns,
                    required,
                })
            }
        }
    }
}

/// Raw rule logic as authored: every field optional, `type` discriminated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleLogicDef {
    #[serde(rename = "type")]
    pub logic_type: String,
    pub patterns: Vec<String>,
    pub required: Option<bool>,
    #[serde(rename = "timeFrame", alias = "time_frame")]
    pub time_frame: Option<String>,
    pub entity_types: Vec<String>,
    pub condition: ConditionMap,
    pub check: Option<String>,
    pub context: Option<String>,
}

/// Raw rule as authored in a catalog file or stored row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDef {
    pub rule_id: String,
    pub category: String,
    pub severity: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub description: String,
    pub logic: RuleLogicDef,
}

fn default_active() -> bool {
    true
}

/// A compiled compliance rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub rule_id: String,
    pub category: RuleCategory,
    pub severity: Severity,
    pub active: bool,
    pub description: String,
    pub logic: RuleLogic,
}

impl Rule {
    /// Compile a raw definition. Unknown categories, severities, or logic
    /// shapes reject the single rule.
    pub fn from_def(def: RuleDef) -> Result<Rule, EvaluationError> {
        let category = RuleCategory::parse(&def.category).ok_or_else(|| {
            EvaluationError::InvalidRule {
                rule_id: def.rule_id.clone(),
                message: format!("unknown category `{}`", def.category),
            }
        })?;
        let severity = Severity::parse(&def.severity).ok_or_else(|| {
            EvaluationError::InvalidRule {
                rule_id: def.rule_id.clone(),
                message: format!("unknown severity `{}`", def.severity),
            }
        })?;
        let logic = RuleLogic::from_def(def.logic)?;
        Ok(Rule {
            rule_id: def.rule_id,
            category,
            severity,
            active: def.active,
            description: def.description,
            logic,
        })
    }
}

/// Returns true for ids shaped `LOxxxx.yy`. Non-canonical ids still
/// evaluate; callers use this for import warnings.
pub fn is_canonical_rule_id(id: &str) -> bool {
    let bytes = id.as_bytes();
    bytes.len() == 9
        && bytes[0] == b'L'
        && bytes[1] == b'O'
        && bytes[2..6].iter().all(u8::is_ascii_digit)
        && bytes[6] == b'.'
        && bytes[7..9].iter().all(u8::is_ascii_digit)
}
