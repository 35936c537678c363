//! Extracted entities and the per-call entity bag.

use serde::{Deserialize, Serialize};

/// Semantic categories an extracted entity can land in.
///
/// `as_str` values double as the JSON keys of the serialized bag, so they
/// are load-bearing for persisted artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Persons,
    Organizations,
    Financial,
    Medical,
    Legal,
    Communication,
    Pii,
    Threatening,
    Geographic,
    ComplianceDisclosures,
    AgentIdentification,
    TimingSensitive,
}

impl EntityCategory {
    /// All categories in stable iteration order.
    pub const ALL: [EntityCategory; 12] = [
        EntityCategory::Persons,
        EntityCategory::Organizations,
        EntityCategory::Financial,
        EntityCategory::Medical,
        EntityCategory::Legal,
        EntityCategory::Communication,
        EntityCategory::Pii,
        EntityCategory::Threatening,
        EntityCategory::Geographic,
        EntityCategory::ComplianceDisclosures,
        EntityCategory::AgentIdentification,
        EntityCategory::TimingSensitive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCategory::Persons => "persons",
            EntityCategory::Organizations => "organizations",
            EntityCategory::Financial => "financial",
            EntityCategory::Medical => "medical",
            EntityCategory::Legal => "legal",
            EntityCategory::Communication => "communication",
            EntityCategory::Pii => "pii",
            EntityCategory::Threatening => "threatening",
            EntityCategory::Geographic => "geographic",
            EntityCategory::ComplianceDisclosures => "compliance_disclosures",
            EntityCategory::AgentIdentification => "agent_identification",
            EntityCategory::TimingSensitive => "timing_sensitive",
        }
    }

    /// Parse a category from its serialized name. Returns `None` for
    /// unknown names so callers can decide between skip and error.
    pub fn parse(name: &str) -> Option<EntityCategory> {
        EntityCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == name)
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single extracted entity with its recognizer confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub confidence: f64,
    /// Type-specific detail, e.g. the PII subtype.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Entity {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
            kind: None,
        }
    }

    pub fn with_kind(text: impl Into<String>, confidence: f64, kind: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence,
            kind: Some(kind.into()),
        }
    }
}

/// Everything extracted from one transcript, bucketed by category.
///
/// The bag is total: extraction failures produce an empty bag with the
/// `error` marker set instead of an absent bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityBag {
    pub persons: Vec<Entity>,
    pub organizations: Vec<Entity>,
    pub financial: Vec<Entity>,
    pub medical: Vec<Entity>,
    pub legal: Vec<Entity>,
    pub communication: Vec<Entity>,
    pub pii: Vec<Entity>,
    pub threatening: Vec<Entity>,
    pub geographic: Vec<Entity>,
    pub compliance_disclosures: Vec<Entity>,
    pub agent_identification: Vec<Entity>,
    pub timing_sensitive: Vec<Entity>,
    /// Set when extraction degraded to an empty bag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EntityBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty bag carrying an extraction error marker.
    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn category(&self, category: EntityCategory) -> &[Entity] {
        match category {
            EntityCategory::Persons => &self.persons,
            EntityCategory::Organizations => &self.organizations,
            EntityCategory::Financial => &self.financial,
            EntityCategory::Medical => &self.medical,
            EntityCategory::Legal => &self.legal,
            EntityCategory::Communication => &self.communication,
            EntityCategory::Pii => &self.pii,
            EntityCategory::Threatening => &self.threatening,
            EntityCategory::Geographic => &self.geographic,
            EntityCategory::ComplianceDisclosures => &self.compliance_disclosures,
            EntityCategory::AgentIdentification => &self.agent_identification,
            EntityCategory::TimingSensitive => &self.timing_sensitive,
        }
    }

    pub fn push(&mut self, category: EntityCategory, entity: Entity) {
        let bucket = match category {
            EntityCategory::Persons => &mut self.persons,
            EntityCategory::Organizations => &mut self.organizations,
            EntityCategory::Financial => &mut self.financial,
            EntityCategory::Medical => &mut self.medical,
            EntityCategory::Legal => &mut self.legal,
            EntityCategory::Communication => &mut self.communication,
            EntityCategory::Pii => &mut self.pii,
            EntityCategory::Threatening => &mut self.threatening,
            EntityCategory::Geographic => &mut self.geographic,
            EntityCategory::ComplianceDisclosures => &mut self.compliance_disclosures,
            EntityCategory::AgentIdentification => &mut self.agent_identification,
            EntityCategory::TimingSensitive => &mut self.timing_sensitive,
        };
        bucket.push(entity);
    }

    /// Iterate all entities in stable category order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityCategory, &Entity)> {
        EntityCategory::ALL
            .iter()
            .flat_map(move |&cat| self.category(cat).iter().map(move |e| (cat, e)))
    }

    pub fn total_count(&self) -> usize {
        EntityCategory::ALL
            .iter()
            .map(|&cat| self.category(cat).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }
}
