//! The closed negative-indicator set and the fixed-shape records keyed by it.
//!
//! RULE: tag statistics are never open string-keyed dictionaries. Every
//! record here carries one named field per canonical indicator, so iterating
//! `NegativeTag::ALL` is exhaustive by construction — adding an indicator is
//! a compile error until every record and match arm handles it.

use serde::{Deserialize, Serialize};

/// The four canonical negative indicators, in canonical order.
///
/// Canonical order is load-bearing: every tie-break in the pipeline (top
/// driver, driver ranking) resolves in favor of the earlier indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeTag {
    TechnicalFailure,
    UnresolvedRequest,
    NegativeFeedback,
    ChurnThreat,
}

impl NegativeTag {
    /// Canonical iteration order. NEVER reorder — tie-breaks depend on it.
    pub const ALL: [NegativeTag; 4] = [
        NegativeTag::TechnicalFailure,
        NegativeTag::UnresolvedRequest,
        NegativeTag::NegativeFeedback,
        NegativeTag::ChurnThreat,
    ];

    /// The indicator every other weight is cross-normalized against.
    pub const BASE: NegativeTag = NegativeTag::UnresolvedRequest;

    /// Canonical metric name as emitted by producers.
    pub fn metric_name(&self) -> &'static str {
        match self {
            Self::TechnicalFailure => "technical_failure",
            Self::UnresolvedRequest => "unresolved_request",
            Self::NegativeFeedback => "negative_feedback",
            Self::ChurnThreat => "churn_threat",
        }
    }

    /// Human-readable label shown on the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TechnicalFailure => "Технические проблемы/сбои",
            Self::UnresolvedRequest => "Запрос не решен",
            Self::NegativeFeedback => "Недовольство обслуживанием",
            Self::ChurnThreat => "Угроза ухода",
        }
    }

    pub fn from_metric(metric: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.metric_name() == metric)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.label() == label)
    }
}

/// Metric names that are positive signals. They contribute to call volume
/// but never produce a negative tag.
pub const POSITIVE_METRICS: [&str; 2] = ["positive_feedback", "gratitude"];

pub fn is_positive_metric(metric: &str) -> bool {
    POSITIVE_METRICS.contains(&metric)
}

/// Resolve the effective negative tag of a single event.
///
/// 1. A metric in the canonical negative set wins outright.
/// 2. A positive metric contributes no tag.
/// 3. Otherwise fall back to the raw tag label if it is recognized.
///
/// Anything else — unknown metrics from upstream ingestion included — is
/// "no negative tag", never an error.
pub fn resolve_negative_tag(metric: &str, tag: &str) -> Option<NegativeTag> {
    if let Some(resolved) = NegativeTag::from_metric(metric) {
        return Some(resolved);
    }
    if is_positive_metric(metric) {
        return None;
    }
    NegativeTag::from_label(tag)
}

/// Which of the four indicators a case has been seen with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagSet {
    pub technical_failure: bool,
    pub unresolved_request: bool,
    pub negative_feedback: bool,
    pub churn_threat: bool,
}

impl TagSet {
    pub fn insert(&mut self, tag: NegativeTag) {
        match tag {
            NegativeTag::TechnicalFailure => self.technical_failure = true,
            NegativeTag::UnresolvedRequest => self.unresolved_request = true,
            NegativeTag::NegativeFeedback => self.negative_feedback = true,
            NegativeTag::ChurnThreat => self.churn_threat = true,
        }
    }

    pub fn contains(&self, tag: NegativeTag) -> bool {
        match tag {
            NegativeTag::TechnicalFailure => self.technical_failure,
            NegativeTag::UnresolvedRequest => self.unresolved_request,
            NegativeTag::NegativeFeedback => self.negative_feedback,
            NegativeTag::ChurnThreat => self.churn_threat,
        }
    }

    pub fn any(&self) -> bool {
        NegativeTag::ALL.into_iter().any(|tag| self.contains(tag))
    }
}

/// Case counts per indicator. Counts are case-level, never event-level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCounts {
    pub technical_failure: u64,
    pub unresolved_request: u64,
    pub negative_feedback: u64,
    pub churn_threat: u64,
}

impl TagCounts {
    pub fn get(&self, tag: NegativeTag) -> u64 {
        match tag {
            NegativeTag::TechnicalFailure => self.technical_failure,
            NegativeTag::UnresolvedRequest => self.unresolved_request,
            NegativeTag::NegativeFeedback => self.negative_feedback,
            NegativeTag::ChurnThreat => self.churn_threat,
        }
    }

    pub fn bump(&mut self, tag: NegativeTag) {
        match tag {
            NegativeTag::TechnicalFailure => self.technical_failure += 1,
            NegativeTag::UnresolvedRequest => self.unresolved_request += 1,
            NegativeTag::NegativeFeedback => self.negative_feedback += 1,
            NegativeTag::ChurnThreat => self.churn_threat += 1,
        }
    }

    pub fn add(&mut self, other: &TagCounts) {
        self.technical_failure += other.technical_failure;
        self.unresolved_request += other.unresolved_request;
        self.negative_feedback += other.negative_feedback;
        self.churn_threat += other.churn_threat;
    }

    /// Total tag assignments across all four indicators. May exceed the
    /// partition's problem-case count: one case can carry several tags.
    pub fn total(&self) -> u64 {
        self.technical_failure
            + self.unresolved_request
            + self.negative_feedback
            + self.churn_threat
    }
}

/// Percentage rates per indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TagRates {
    pub technical_failure: f64,
    pub unresolved_request: f64,
    pub negative_feedback: f64,
    pub churn_threat: f64,
}

impl TagRates {
    pub fn get(&self, tag: NegativeTag) -> f64 {
        match tag {
            NegativeTag::TechnicalFailure => self.technical_failure,
            NegativeTag::UnresolvedRequest => self.unresolved_request,
            NegativeTag::NegativeFeedback => self.negative_feedback,
            NegativeTag::ChurnThreat => self.churn_threat,
        }
    }

    pub fn set(&mut self, tag: NegativeTag, rate: f64) {
        match tag {
            NegativeTag::TechnicalFailure => self.technical_failure = rate,
            NegativeTag::UnresolvedRequest => self.unresolved_request = rate,
            NegativeTag::NegativeFeedback => self.negative_feedback = rate,
            NegativeTag::ChurnThreat => self.churn_threat = rate,
        }
    }
}
