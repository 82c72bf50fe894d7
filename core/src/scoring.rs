//! Scoring engine — weighted dissatisfaction score and zone classification.
//!
//! Two explicit phases:
//!   1. `derive_weights` turns aggregate tag counts (domain-level totals)
//!      into a `ScoreWeights` value object — once per computation.
//!   2. `dissatisfaction_score` applies those weights to one partition's
//!      rollup. Weights are threaded through every call, never recomputed
//!      per bucket and never held as shared mutable state.

use crate::{
    rollup::RollupStats,
    tags::{NegativeTag, TagCounts},
};
use serde::{Deserialize, Serialize};

/// Extra weight on the churn-threat indicator, applied on top of its
/// cross-normalized weight. Policy constant: the indicator is treated as
/// categorically more severe regardless of frequency.
pub const CHURN_CRITICAL_MULTIPLIER: f64 = 1.5;

/// Zone policy constants over the score scale. Fixed — the same numeric
/// score always maps to the same zone regardless of dataset size or period.
pub const SCORE_GREEN_CEILING: f64 = 0.30;
pub const SCORE_RED_FLOOR: f64 = 0.60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Green,
    Yellow,
    Red,
}

/// A pair of scalar boundaries: `score <= lower` is green, `score >= upper`
/// is red, anything between is yellow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneThresholds {
    pub lower: f64,
    pub upper: f64,
}

impl ZoneThresholds {
    /// Ordered thresholds from two cut points given in either order.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            lower: a.min(b),
            upper: a.max(b),
        }
    }

    /// The fixed policy thresholds for the dissatisfaction score.
    pub fn policy() -> Self {
        Self::new(SCORE_GREEN_CEILING, SCORE_RED_FLOOR)
    }

    /// Total over all scores: every score lands in exactly one zone.
    pub fn classify(&self, score: f64) -> Zone {
        if score <= self.lower {
            Zone::Green
        } else if score >= self.upper {
            Zone::Red
        } else {
            Zone::Yellow
        }
    }
}

/// Cross-normalized indicator weights, derived once per computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub technical_failure: f64,
    pub unresolved_request: f64,
    pub negative_feedback: f64,
    pub churn_threat: f64,
}

impl ScoreWeights {
    pub fn get(&self, tag: NegativeTag) -> f64 {
        match tag {
            NegativeTag::TechnicalFailure => self.technical_failure,
            NegativeTag::UnresolvedRequest => self.unresolved_request,
            NegativeTag::NegativeFeedback => self.negative_feedback,
            NegativeTag::ChurnThreat => self.churn_threat,
        }
    }
}

/// Derive indicator weights from aggregate tag case counts.
///
/// The base indicator keeps weight 1.0. Every other indicator is
/// cross-normalized against the base's aggregate count, equalizing nominal
/// contributions despite very different base rates. An indicator with a
/// zero aggregate count gets weight 0.0 — safe division, never NaN.
pub fn derive_weights(totals: &TagCounts) -> ScoreWeights {
    let base_count = totals.get(NegativeTag::BASE) as f64;
    let weight_for = |tag: NegativeTag| -> f64 {
        if tag == NegativeTag::BASE {
            return 1.0;
        }
        let count = totals.get(tag) as f64;
        if count <= 0.0 {
            0.0
        } else {
            base_count / count
        }
    };
    ScoreWeights {
        technical_failure: weight_for(NegativeTag::TechnicalFailure),
        unresolved_request: weight_for(NegativeTag::UnresolvedRequest),
        negative_feedback: weight_for(NegativeTag::NegativeFeedback),
        churn_threat: weight_for(NegativeTag::ChurnThreat) * CHURN_CRITICAL_MULTIPLIER,
    }
}

/// Weighted dissatisfaction score of one partition:
/// `Σ case_share(tag) × weight(tag)`. Zero for an empty partition.
pub fn dissatisfaction_score(stats: &RollupStats, weights: &ScoreWeights) -> f64 {
    if stats.total_calls == 0 {
        return 0.0;
    }
    NegativeTag::ALL
        .into_iter()
        .map(|tag| stats.case_share(tag) * weights.get(tag))
        .sum()
}

/// The tag with the highest case count in a partition. Canonical order
/// breaks ties; a best count of zero means no dominant driver.
pub fn top_driver(counts: &TagCounts) -> Option<NegativeTag> {
    let mut best: Option<(NegativeTag, u64)> = None;
    for tag in NegativeTag::ALL {
        let count = counts.get(tag);
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((tag, count)),
        }
    }
    best.filter(|(_, count)| *count > 0).map(|(tag, _)| tag)
}
