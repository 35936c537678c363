//! Rule decisions and entity evidence partitioning.

use hark_core::constants::LOW_CONFIDENCE_REASON;
use hark_core::types::{EntityBag, EntityCategory, EvidenceEntry, LowConfidenceEntity};

/// Outcome of evaluating one rule against one call.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub violation: bool,
    pub confidence: f64,
    pub quality_score: f64,
    pub evidence: Vec<EvidenceEntry>,
    pub low_confidence_entities: Vec<LowConfidenceEntity>,
    pub requires_manual_review: bool,
}

impl Decision {
    /// A clean, fully-confident compliant decision.
    pub fn compliant() -> Self {
        Self::certain(false)
    }

    /// A decision driven purely by pattern or flag checks, which are
    /// authoritative and carry no entity uncertainty.
    pub fn certain(violation: bool) -> Self {
        Self {
            violation,
            confidence: 1.0,
            quality_score: 1.0,
            evidence: Vec::new(),
            low_confidence_entities: Vec::new(),
            requires_manual_review: false,
        }
    }

    /// A decision annotated with the consulted-entity partition.
    pub fn with_evidence(violation: bool, evidence: EntityEvidence) -> Self {
        Self {
            violation,
            confidence: evidence.quality_score,
            quality_score: evidence.quality_score,
            evidence: evidence.evidence,
            low_confidence_entities: evidence.low_confidence,
            requires_manual_review: evidence.requires_manual_review,
        }
    }
}

/// The consulted-entity partition behind a decision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityEvidence {
    pub evidence: Vec<EvidenceEntry>,
    pub low_confidence: Vec<LowConfidenceEntity>,
    pub quality_score: f64,
    pub requires_manual_review: bool,
}

/// Partitions the consulted categories of `bag` at the evidence threshold.
///
/// Entities at or above the line become evidence entries; the rest become
/// low-confidence entries with the standard reason. The quality score is the
/// mean confidence of everything consulted, or 1.0 when nothing was.
/// Manual review triggers on any low-confidence entry or a quality score
/// below the review threshold.
pub fn partition_entities(
    bag: &EntityBag,
    categories: &[EntityCategory],
    evidence_threshold: f64,
    review_threshold: f64,
) -> EntityEvidence {
    let mut evidence = Vec::new();
    let mut low_confidence = Vec::new();
    let mut total = 0.0f64;
    let mut count = 0usize;

    for &category in categories {
        for entity in bag.category(category) {
            total += entity.confidence;
            count += 1;
            if entity.confidence >= evidence_threshold {
                evidence.push(EvidenceEntry {
                    category,
                    text: entity.text.clone(),
                    confidence: entity.confidence,
                });
            } else {
                low_confidence.push(LowConfidenceEntity {
                    category,
                    text: entity.text.clone(),
                    confidence: entity.confidence,
                    reason: LOW_CONFIDENCE_REASON.to_string(),
                });
            }
        }
    }

    let quality_score = if count == 0 { 1.0 } else { total / count as f64 };
    let requires_manual_review = !low_confidence.is_empty() || quality_score < review_threshold;
    EntityEvidence {
        evidence,
        low_confidence,
        quality_score,
        requires_manual_review,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hark_core::types::Entity;

    fn bag() -> EntityBag {
        let mut bag = EntityBag::new();
        bag.push(EntityCategory::Persons, Entity::new("John Smith", 0.92));
        bag.push(EntityCategory::Persons, Entity::new("Mike", 0.75));
        bag.push(
            EntityCategory::Threatening,
            Entity::new("garnish your wages", 0.93),
        );
        bag
    }

    #[test]
    fn test_partition_splits_at_threshold() {
        let result = partition_entities(&bag(), &[EntityCategory::Persons], 0.8, 0.8);
        assert_eq!(result.evidence.len(), 1);
        assert_eq!(result.evidence[0].text, "John Smith");
        assert_eq!(result.low_confidence.len(), 1);
        assert_eq!(result.low_confidence[0].text, "Mike");
        assert_eq!(
            result.low_confidence[0].reason,
            "Below 80% confidence threshold"
        );
    }

    #[test]
    fn test_exact_threshold_counts_as_evidence() {
        let mut bag = EntityBag::new();
        bag.push(EntityCategory::Persons, Entity::new("Jane Doe", 0.8));
        let result = partition_entities(&bag, &[EntityCategory::Persons], 0.8, 0.8);
        assert_eq!(result.evidence.len(), 1);
        assert!(result.low_confidence.is_empty());
    }

    #[test]
    fn test_quality_is_mean_of_consulted() {
        let result = partition_entities(&bag(), &[EntityCategory::Persons], 0.8, 0.8);
        let expected = (0.92 + 0.75) / 2.0;
        assert!((result.quality_score - expected).abs() < 1e-9);
        // The threatening entity was not consulted.
        assert!(result.evidence.iter().all(|e| e.category == EntityCategory::Persons));
    }

    #[test]
    fn test_no_consulted_entities_is_full_quality() {
        let result = partition_entities(&bag(), &[EntityCategory::Medical], 0.8, 0.8);
        assert_eq!(result.quality_score, 1.0);
        assert!(!result.requires_manual_review);
        assert!(result.evidence.is_empty());
    }

    #[test]
    fn test_low_confidence_forces_review() {
        let result = partition_entities(&bag(), &[EntityCategory::Persons], 0.8, 0.8);
        assert!(result.requires_manual_review);

        let clean = partition_entities(&bag(), &[EntityCategory::Threatening], 0.8, 0.8);
        assert!(!clean.requires_manual_review);
    }

    #[test]
    fn test_low_quality_alone_forces_review() {
        let mut bag = EntityBag::new();
        // Both above the evidence line, mean below the review line.
        bag.push(EntityCategory::Persons, Entity::new("A B", 0.81));
        bag.push(EntityCategory::Persons, Entity::new("C D", 0.82));
        let result = partition_entities(&bag, &[EntityCategory::Persons], 0.8, 0.9);
        assert!(result.low_confidence.is_empty());
        assert!(result.requires_manual_review);
    }

    #[test]
    fn test_decision_constructors() {
        let clean = Decision::compliant();
        assert!(!clean.violation);
        assert_eq!(clean.confidence, 1.0);

        let fired = Decision::certain(true);
        assert!(fired.violation);
        assert!(!fired.requires_manual_review);

        let partition = partition_entities(&bag(), &[EntityCategory::Persons], 0.8, 0.8);
        let with = Decision::with_evidence(true, partition);
        assert!(with.violation);
        assert!(with.requires_manual_review);
        assert_eq!(with.confidence, with.quality_score);
    }
}
