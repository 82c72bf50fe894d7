//! Overlap engine — comparable percentage series across metrics/domains.
//!
//! Inputs are already-computed percentage series, not raw events. Values
//! are averaged within each bucket; series that never leave zero across the
//! visible window are dropped entirely (a flat-zero series is noise, not
//! signal). Zone cut points are passed per call: this engine serves several
//! visual contexts with different sensitivity requirements.
//!
//! The snapshot view (one summary point per series) and the timeline view
//! (the full per-bucket series) derive from the same per-bucket averages,
//! so the two can never disagree.

use crate::{
    dates::{self, Granularity},
    scoring::{Zone, ZoneThresholds},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One observation of a percentage metric on a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: String,
    pub value: f64,
}

/// A named percentage series as produced by an upstream computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

impl MetricSeries {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
        }
    }

    pub fn push(&mut self, date: impl Into<String>, value: f64) {
        self.points.push(SeriesPoint {
            date: date.into(),
            value,
        });
    }
}

/// Per-call zone cut points over the percentage scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneCutoffs {
    pub green_max: f64,
    pub red_min: f64,
}

impl ZoneCutoffs {
    pub fn classify(&self, value: f64) -> Zone {
        ZoneThresholds::new(self.green_max, self.red_min).classify(value)
    }
}

/// One summary point per surviving series: its all-time average rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapSnapshot {
    pub name: String,
    pub avg_rate_pct: f64,
    pub zone: Zone,
}

/// One surviving series aligned to the common bucket axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapSeries {
    pub name: String,
    /// Index-aligned with `OverlapAnalytics::bucket_dates`.
    pub values: Vec<f64>,
    pub zones: Vec<Zone>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlapAnalytics {
    pub bucket_dates: Vec<String>,
    pub snapshot: Vec<OverlapSnapshot>,
    pub timeline: Vec<OverlapSeries>,
}

struct AveragedSeries {
    name: String,
    buckets: BTreeMap<String, f64>,
}

/// Bucket every series, average within buckets, align to the union of
/// bucket dates, drop flat-zero series, classify every value.
pub fn build_overlap(
    series: &[MetricSeries],
    granularity: Granularity,
    cutoffs: &ZoneCutoffs,
) -> OverlapAnalytics {
    let mut averaged: Vec<AveragedSeries> = Vec::new();
    for input in series {
        let mut sums: BTreeMap<String, (f64, u64)> = BTreeMap::new();
        for point in &input.points {
            let Some(key) = dates::bucket_key(&point.date, granularity) else {
                continue;
            };
            let entry = sums.entry(key).or_insert((0.0, 0));
            entry.0 += point.value;
            entry.1 += 1;
        }
        let buckets: BTreeMap<String, f64> = sums
            .into_iter()
            .map(|(key, (sum, count))| (key, sum / count as f64))
            .collect();

        if buckets.values().all(|value| *value == 0.0) {
            log::debug!("overlap: dropping flat-zero series '{}'", input.name);
            continue;
        }
        averaged.push(AveragedSeries {
            name: input.name.clone(),
            buckets,
        });
    }

    let bucket_dates: Vec<String> = averaged
        .iter()
        .flat_map(|series| series.buckets.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let timeline: Vec<OverlapSeries> = averaged
        .iter()
        .map(|series| {
            let values: Vec<f64> = bucket_dates
                .iter()
                .map(|date| series.buckets.get(date).copied().unwrap_or(0.0))
                .collect();
            let zones: Vec<Zone> = values.iter().map(|value| cutoffs.classify(*value)).collect();
            OverlapSeries {
                name: series.name.clone(),
                values,
                zones,
            }
        })
        .collect();

    let mut snapshot: Vec<OverlapSnapshot> = averaged
        .iter()
        .map(|series| {
            let count = series.buckets.len();
            let avg = if count == 0 {
                0.0
            } else {
                series.buckets.values().sum::<f64>() / count as f64
            };
            OverlapSnapshot {
                name: series.name.clone(),
                avg_rate_pct: avg,
                zone: cutoffs.classify(avg),
            }
        })
        .collect();
    snapshot.sort_by(|a, b| {
        b.avg_rate_pct
            .partial_cmp(&a.avg_rate_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });

    OverlapAnalytics {
        bucket_dates,
        snapshot,
        timeline,
    }
}
