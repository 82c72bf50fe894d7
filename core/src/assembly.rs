//! Analytics assembly — the orchestration layer of the pipeline.
//!
//! PIPELINE ORDER (fixed, documented, never reordered):
//!   1. Filter events (sector, product group, normalized date range).
//!   2. Domain rollup over product groups.
//!   3. Weight derivation from domain totals — once per call. Weights are
//!      period-independent; they are never recomputed per time bucket.
//!   4. Bucket rollup over the contiguous bucket axis.
//!   5. Scoring and zone classification for buckets and domains.
//!   6. Executive summary from the last two buckets.
//!   7. Driver ranking over the full bucket series.
//!
//! Everything here is pure over immutable inputs: inputs are never mutated
//! and every call returns freshly allocated structures.

use crate::{
    dates::{self, DateRange, Granularity},
    event::CallEvent,
    overlap::{self, MetricSeries, OverlapAnalytics, ZoneCutoffs},
    rollup::{self, DomainDimension, RollupStats},
    scoring::{self, ScoreWeights, Zone, ZoneThresholds},
    tags::{NegativeTag, TagCounts, TagRates},
};
use serde::{Deserialize, Serialize};

/// Filter descriptor as it arrives from the toolbar. `None` selects every
/// value of that dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub product_group: Option<String>,
    #[serde(default)]
    pub range: DateRange,
}

/// One time-aggregated partition of cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Bucket date key, truncated per granularity.
    pub date: String,
    pub total_calls: u64,
    pub problem_calls_unique: u64,
    pub problem_rate_pct: f64,
    pub tag_counts: TagCounts,
    pub tag_rates_pct: TagRates,
    pub consult_total_calls: u64,
    pub consult_problem_unique: u64,
    pub consult_tag_counts: TagCounts,
    pub score: f64,
    pub zone: Zone,
}

/// One categorical partition of cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainPoint {
    pub domain: String,
    pub total_calls: u64,
    pub problem_calls_unique: u64,
    pub problem_rate_pct: f64,
    pub tag_counts: TagCounts,
    pub tag_rates_pct: TagRates,
    pub consult_total_calls: u64,
    pub consult_problem_unique: u64,
    pub consult_tag_counts: TagCounts,
    pub score: f64,
    pub zone: Zone,
    /// `None` is the "no dominant driver" sentinel.
    pub top_driver: Option<NegativeTag>,
    pub top_driver_label: Option<String>,
}

/// Period-over-period movement between the last two buckets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodDelta {
    pub score_delta: f64,
    pub problem_delta: i64,
    pub rate_delta_pp: f64,
    pub volume_delta: i64,
}

/// The most recent bucket, the one before it, and their deltas. All `None`
/// with zero buckets; `delta` is `None` with exactly one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub current: Option<Bucket>,
    pub previous: Option<Bucket>,
    pub delta: Option<PeriodDelta>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Dead zone around zero for the driver trend, in percentage points.
/// Movements inside it are noise, not a trend.
pub const TREND_DEAD_ZONE_PP: f64 = 0.2;

/// One negative tag ranked by its contribution to total problem volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRow {
    pub tag: NegativeTag,
    pub label: String,
    /// Share of all tag assignments across the whole visible window.
    pub contribution_pct: f64,
    /// Contribution share within the most recent bucket.
    pub current_pct: f64,
    /// Contribution share within the bucket before it.
    pub previous_pct: f64,
    pub delta_pp: f64,
    pub trend: Trend,
}

/// The full derived-analytics result consumed by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub buckets: Vec<Bucket>,
    pub domains: Vec<DomainPoint>,
    pub summary: ExecutiveSummary,
    pub drivers: Vec<DriverRow>,
    pub weights: ScoreWeights,
}

impl Analytics {
    /// The well-typed empty result: empty containers, `None` summary
    /// fields, weights derived from empty totals.
    pub fn empty() -> Self {
        Self {
            buckets: Vec::new(),
            domains: Vec::new(),
            summary: ExecutiveSummary::default(),
            drivers: Vec::new(),
            weights: scoring::derive_weights(&TagCounts::default()),
        }
    }
}

/// Run the full pipeline for one filter/granularity combination.
pub fn build_analytics(
    events: &[CallEvent],
    filter: &Filter,
    granularity: Granularity,
) -> Analytics {
    let range = dates::normalize_range(&filter.range);
    let filtered: Vec<&CallEvent> = events
        .iter()
        .filter(|event| matches(event, filter, &range))
        .collect();
    if filtered.is_empty() {
        log::debug!("assembly: no events after filtering, returning empty analytics");
        return Analytics::empty();
    }

    let domain_rollup = rollup::rollup_by_domain(filtered.iter().copied(), DomainDimension::ProductGroup);
    let mut totals = TagCounts::default();
    for stats in domain_rollup.values() {
        totals.add(&stats.tag_counts);
    }
    let weights = scoring::derive_weights(&totals);
    let thresholds = ZoneThresholds::policy();

    let mut bucket_rollup = rollup::rollup_by_bucket(filtered.iter().copied(), granularity);
    for key in bucket_axis(&range, granularity) {
        bucket_rollup.entry(key).or_default();
    }

    let buckets: Vec<Bucket> = bucket_rollup
        .iter()
        .map(|(date, stats)| make_bucket(date, stats, &weights, &thresholds))
        .collect();
    let domains: Vec<DomainPoint> = domain_rollup
        .iter()
        .map(|(domain, stats)| make_domain(domain, stats, &weights, &thresholds))
        .collect();

    let summary = executive_summary(&buckets);
    let drivers = driver_rows(&buckets);

    log::info!(
        "assembly: {} events -> {} buckets, {} domains",
        filtered.len(),
        buckets.len(),
        domains.len(),
    );

    Analytics {
        buckets,
        domains,
        summary,
        drivers,
        weights,
    }
}

/// Cross-metric comparison view: one percentage series per indicator built
/// from day-level case shares, then bucketed by the requested granularity.
pub fn tag_overlap(
    events: &[CallEvent],
    filter: &Filter,
    granularity: Granularity,
    cutoffs: &ZoneCutoffs,
) -> OverlapAnalytics {
    let range = dates::normalize_range(&filter.range);
    let filtered: Vec<&CallEvent> = events
        .iter()
        .filter(|event| matches(event, filter, &range))
        .collect();
    let daily = rollup::rollup_by_bucket(filtered.iter().copied(), Granularity::Day);

    let mut series: Vec<MetricSeries> = NegativeTag::ALL
        .into_iter()
        .map(|tag| MetricSeries::new(tag.label()))
        .collect();
    for (day, stats) in &daily {
        for (index, tag) in NegativeTag::ALL.into_iter().enumerate() {
            series[index].push(day.clone(), share_pct(stats.tag_counts.get(tag), stats.total_calls));
        }
    }
    overlap::build_overlap(&series, granularity, cutoffs)
}

/// Cross-domain comparison view: one percentage series per domain value
/// (its daily problem-case rate), bucketed by the requested granularity.
/// Domains that never produce a problem case drop out as flat-zero series.
pub fn domain_overlap(
    events: &[CallEvent],
    filter: &Filter,
    dimension: DomainDimension,
    granularity: Granularity,
    cutoffs: &ZoneCutoffs,
) -> OverlapAnalytics {
    let range = dates::normalize_range(&filter.range);
    let filtered: Vec<&CallEvent> = events
        .iter()
        .filter(|event| matches(event, filter, &range))
        .collect();

    let domain_keys: std::collections::BTreeSet<&str> = filtered
        .iter()
        .map(|event| dimension.key_of(event))
        .collect();

    let mut series: Vec<MetricSeries> = Vec::new();
    for domain in domain_keys {
        let members: Vec<&CallEvent> = filtered
            .iter()
            .copied()
            .filter(|event| dimension.key_of(event) == domain)
            .collect();
        let daily = rollup::rollup_by_bucket(members, Granularity::Day);
        let mut one = MetricSeries::new(domain);
        for (day, stats) in &daily {
            one.push(day.clone(), stats.problem_rate_pct());
        }
        series.push(one);
    }
    overlap::build_overlap(&series, granularity, cutoffs)
}

fn matches(event: &CallEvent, filter: &Filter, range: &DateRange) -> bool {
    if let Some(sector) = &filter.sector {
        if event.sector != *sector {
            return false;
        }
    }
    if let Some(product_group) = &filter.product_group {
        if event.product_group != *product_group {
            return false;
        }
    }
    if let (Some(from), Some(to)) = (&range.from, &range.to) {
        match (
            dates::parse_day_key(&event.date),
            dates::parse_day_key(from),
            dates::parse_day_key(to),
        ) {
            (Some(date), Some(start), Some(end)) => {
                if date < start || date > end {
                    return false;
                }
            }
            // An unparseable event date never matches a bounded range.
            (None, Some(_), Some(_)) => return false,
            // An unparseable range imposes no date constraint.
            _ => {}
        }
    }
    true
}

/// The zero-filled bucket axis across the normalized filter range, snapped
/// outward per granularity. Empty when the range is absent or unparseable —
/// observed event dates then define the axis on their own.
fn bucket_axis(range: &DateRange, granularity: Granularity) -> Vec<String> {
    let (Some(from), Some(to)) = (
        range.from.as_deref().and_then(dates::parse_day_key),
        range.to.as_deref().and_then(dates::parse_day_key),
    ) else {
        return Vec::new();
    };
    let (start, end) = dates::snap_range(from, to, granularity);
    dates::contiguous_bucket_keys(
        &dates::format_day_key(start),
        &dates::format_day_key(end),
        granularity,
    )
}

fn make_bucket(
    date: &str,
    stats: &RollupStats,
    weights: &ScoreWeights,
    thresholds: &ZoneThresholds,
) -> Bucket {
    let score = scoring::dissatisfaction_score(stats, weights);
    Bucket {
        date: date.to_string(),
        total_calls: stats.total_calls,
        problem_calls_unique: stats.problem_calls_unique,
        problem_rate_pct: stats.problem_rate_pct(),
        tag_counts: stats.tag_counts,
        tag_rates_pct: tag_rates(stats),
        consult_total_calls: stats.consult_total_calls,
        consult_problem_unique: stats.consult_problem_unique,
        consult_tag_counts: stats.consult_tag_counts,
        score,
        zone: thresholds.classify(score),
    }
}

fn make_domain(
    domain: &str,
    stats: &RollupStats,
    weights: &ScoreWeights,
    thresholds: &ZoneThresholds,
) -> DomainPoint {
    let score = scoring::dissatisfaction_score(stats, weights);
    let top_driver = scoring::top_driver(&stats.tag_counts);
    DomainPoint {
        domain: domain.to_string(),
        total_calls: stats.total_calls,
        problem_calls_unique: stats.problem_calls_unique,
        problem_rate_pct: stats.problem_rate_pct(),
        tag_counts: stats.tag_counts,
        tag_rates_pct: tag_rates(stats),
        consult_total_calls: stats.consult_total_calls,
        consult_problem_unique: stats.consult_problem_unique,
        consult_tag_counts: stats.consult_tag_counts,
        score,
        zone: thresholds.classify(score),
        top_driver,
        top_driver_label: top_driver.map(|tag| tag.label().to_string()),
    }
}

fn tag_rates(stats: &RollupStats) -> TagRates {
    let mut rates = TagRates::default();
    for tag in NegativeTag::ALL {
        rates.set(tag, share_pct(stats.tag_counts.get(tag), stats.total_calls));
    }
    rates
}

fn executive_summary(buckets: &[Bucket]) -> ExecutiveSummary {
    let current = buckets.last().cloned();
    let previous = buckets
        .len()
        .checked_sub(2)
        .and_then(|index| buckets.get(index))
        .cloned();
    let delta = match (&current, &previous) {
        (Some(cur), Some(prev)) => Some(PeriodDelta {
            score_delta: cur.score - prev.score,
            problem_delta: cur.problem_calls_unique as i64 - prev.problem_calls_unique as i64,
            rate_delta_pp: cur.problem_rate_pct - prev.problem_rate_pct,
            volume_delta: cur.total_calls as i64 - prev.total_calls as i64,
        }),
        _ => None,
    };
    ExecutiveSummary {
        current,
        previous,
        delta,
    }
}

/// Driver ranking over the full bucket series: window-wide contribution
/// shares plus the last-vs-previous bucket movement.
fn driver_rows(buckets: &[Bucket]) -> Vec<DriverRow> {
    let mut window_totals = TagCounts::default();
    for bucket in buckets {
        window_totals.add(&bucket.tag_counts);
    }
    let window_assignments = window_totals.total();

    let current = buckets.last();
    let previous = buckets
        .len()
        .checked_sub(2)
        .and_then(|index| buckets.get(index));

    let mut rows: Vec<DriverRow> = NegativeTag::ALL
        .into_iter()
        .map(|tag| {
            let contribution_pct = share_pct(window_totals.get(tag), window_assignments);
            let current_pct = current
                .map(|bucket| share_pct(bucket.tag_counts.get(tag), bucket.tag_counts.total()))
                .unwrap_or(0.0);
            let previous_pct = previous
                .map(|bucket| share_pct(bucket.tag_counts.get(tag), bucket.tag_counts.total()))
                .unwrap_or(0.0);
            let delta_pp = current_pct - previous_pct;
            let trend = if delta_pp > TREND_DEAD_ZONE_PP {
                Trend::Up
            } else if delta_pp < -TREND_DEAD_ZONE_PP {
                Trend::Down
            } else {
                Trend::Flat
            };
            DriverRow {
                tag,
                label: tag.label().to_string(),
                contribution_pct,
                current_pct,
                previous_pct,
                delta_pp,
                trend,
            }
        })
        .collect();
    // Stable sort: canonical order survives among equal contributions.
    rows.sort_by(|a, b| {
        b.contribution_pct
            .partial_cmp(&a.contribution_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}

fn share_pct(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
