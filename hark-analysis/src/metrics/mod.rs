//! Fleet-level extraction quality metrics.

use hark_core::constants::EVIDENCE_CONFIDENCE_THRESHOLD;
use hark_core::types::{EntityBag, EntityCategory};
use serde::Serialize;

/// Review posture for one entity category, derived from its low-confidence
/// share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReviewBand {
    Review,
    Monitor,
    Good,
    NoData,
}

impl ReviewBand {
    /// Band for a low-confidence percentage: above 20% needs review, above
    /// 10% is worth monitoring, anything else is good.
    pub fn from_low_confidence_pct(pct: f64) -> ReviewBand {
        if pct > 20.0 {
            ReviewBand::Review
        } else if pct > 10.0 {
            ReviewBand::Monitor
        } else {
            ReviewBand::Good
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReviewBand::Review => "Review",
            ReviewBand::Monitor => "Monitor",
            ReviewBand::Good => "Good",
            ReviewBand::NoData => "No Data",
        }
    }
}

impl std::fmt::Display for ReviewBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Extraction quality rollup for one entity category across many calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMetrics {
    pub category: EntityCategory,
    pub total_detected: usize,
    /// Mean confidence as a percentage, one decimal.
    pub avg_confidence_pct: f64,
    pub low_confidence_count: usize,
    /// Share of detections below the evidence threshold, one decimal.
    pub low_confidence_pct: f64,
    pub band: ReviewBand,
}

/// Computes per-category quality metrics over a set of entity bags, in
/// stable category order. Categories with no detections report the
/// `NoData` band and zeroed figures.
pub fn entity_metrics<'a, I>(bags: I) -> Vec<CategoryMetrics>
where
    I: IntoIterator<Item = &'a EntityBag>,
{
    let mut totals = [0usize; EntityCategory::ALL.len()];
    let mut sums = [0.0f64; EntityCategory::ALL.len()];
    let mut lows = [0usize; EntityCategory::ALL.len()];

    for bag in bags {
        for (index, &category) in EntityCategory::ALL.iter().enumerate() {
            for entity in bag.category(category) {
                totals[index] += 1;
                sums[index] += entity.confidence;
                if entity.confidence < EVIDENCE_CONFIDENCE_THRESHOLD {
                    lows[index] += 1;
                }
            }
        }
    }

    EntityCategory::ALL
        .iter()
        .enumerate()
        .map(|(index, &category)| {
            let total = totals[index];
            if total == 0 {
                return CategoryMetrics {
                    category,
                    total_detected: 0,
                    avg_confidence_pct: 0.0,
                    low_confidence_count: 0,
                    low_confidence_pct: 0.0,
                    band: ReviewBand::NoData,
                };
            }
            let avg_confidence_pct = round1(sums[index] / total as f64 * 100.0);
            let low_confidence_pct = round1(lows[index] as f64 / total as f64 * 100.0);
            CategoryMetrics {
                category,
                total_detected: total,
                avg_confidence_pct,
                low_confidence_count: lows[index],
                low_confidence_pct,
                band: ReviewBand::from_low_confidence_pct(low_confidence_pct),
            }
        })
        .collect()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
