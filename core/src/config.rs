//! Generator scenario configuration.
//!
//! Weighted catalogs for the categorical dimensions plus incidence rates
//! for the indicators. Ships with a built-in banking demo profile; a JSON
//! file can override it for other scenarios.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::tags::NegativeTag;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedLabel {
    pub label: String,
    pub weight: f64,
}

impl WeightedLabel {
    fn new(label: &str, weight: f64) -> Self {
        Self {
            label: label.to_string(),
            weight,
        }
    }
}

/// Relative incidence of the four indicators among negative cases.
/// Fixed shape — one field per canonical indicator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndicatorWeights {
    pub technical_failure: f64,
    pub unresolved_request: f64,
    pub negative_feedback: f64,
    pub churn_threat: f64,
}

impl IndicatorWeights {
    /// Weights in canonical indicator order.
    pub fn as_array(&self) -> [f64; 4] {
        let mut weights = [0.0; 4];
        for (slot, tag) in weights.iter_mut().zip(NegativeTag::ALL) {
            *slot = match tag {
                NegativeTag::TechnicalFailure => self.technical_failure,
                NegativeTag::UnresolvedRequest => self.unresolved_request,
                NegativeTag::NegativeFeedback => self.negative_feedback,
                NegativeTag::ChurnThreat => self.churn_threat,
            };
        }
        weights
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub sectors: Vec<WeightedLabel>,
    pub product_groups: Vec<WeightedLabel>,
    pub channels: Vec<WeightedLabel>,
    /// Mean distinct cases per day; actual daily volume jitters around it.
    pub cases_per_day: u64,
    /// Share of cases opened as consultations (the rest are claims).
    pub consultation_share: f64,
    /// Share of cases carrying at least one negative tag.
    pub negative_share: f64,
    pub indicator_weights: IndicatorWeights,
    /// Probability that a negative case carries a second, different tag.
    pub second_tag_share: f64,
    /// Share of tag-free cases that still report a positive metric.
    pub positive_share: f64,
}

impl GeneratorConfig {
    /// The built-in banking demo profile.
    pub fn default_profile() -> Self {
        Self {
            sectors: vec![
                WeightedLabel::new("Розничный банк", 0.62),
                WeightedLabel::new("Малый бизнес", 0.23),
                WeightedLabel::new("Премиум", 0.15),
            ],
            product_groups: vec![
                WeightedLabel::new("Дебетовые карты", 0.30),
                WeightedLabel::new("Кредитные карты", 0.24),
                WeightedLabel::new("Ипотека", 0.12),
                WeightedLabel::new("Вклады", 0.14),
                WeightedLabel::new("Мобильное приложение", 0.20),
            ],
            channels: vec![
                WeightedLabel::new("Телефон", 0.48),
                WeightedLabel::new("Чат", 0.34),
                WeightedLabel::new("Отделение", 0.18),
            ],
            cases_per_day: 40,
            consultation_share: 0.55,
            negative_share: 0.28,
            indicator_weights: IndicatorWeights {
                technical_failure: 0.30,
                unresolved_request: 0.40,
                negative_feedback: 0.22,
                churn_threat: 0.08,
            },
            second_tag_share: 0.18,
            positive_share: 0.25,
        }
    }

    /// Load a scenario profile from a JSON file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading generator config {path}"))?;
        let config: GeneratorConfig =
            serde_json::from_str(&raw).with_context(|| format!("parsing generator config {path}"))?;
        Ok(config)
    }
}
