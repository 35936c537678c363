//! Shared domain model: rules, reference records, entities, violations.

pub mod entity;
pub mod reference;
pub mod rule;
pub mod violation;

pub use entity::{Entity, EntityBag, EntityCategory};
pub use reference::{FieldValue, ReferenceRecord};
pub use rule::{
    is_canonical_rule_id, ConditionMap, ConditionValue, PatternList, Rule, RuleCategory, RuleDef,
    RuleKind, RuleLogic, RuleLogicDef, SentimentCheck, Severity, TimeWindow,
};
pub use violation::{format_violation_date, EvidenceEntry, LowConfidenceEntity, ViolationRecord};
