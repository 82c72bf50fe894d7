//! Case-level rollup engine.
//!
//! Converts a flat event list into per-bucket and per-domain case
//! statistics. The dedup-by-case step is the load-bearing invariant of the
//! whole pipeline: problem counting is by unique case, never by raw event
//! count. Tagging one case twice with the same indicator counts it once.
//!
//! Invariants enforced by construction:
//!   - `problem_calls_unique <= total_calls` in every partition.
//!   - Each individual tag's case count `<= total_calls`.
//!   - A case with zero negative-tag events still counts toward volume.

use crate::{
    dates::{self, Granularity},
    event::{CallEvent, DialogueType},
    tags::{self, NegativeTag, TagCounts, TagSet},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Which categorical dimension keys the domain rollup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainDimension {
    Sector,
    ProductGroup,
    Channel,
}

impl DomainDimension {
    /// The partition key this dimension extracts from an event.
    pub fn key_of<'a>(&self, event: &'a CallEvent) -> &'a str {
        match self {
            Self::Sector => &event.sector,
            Self::ProductGroup => &event.product_group,
            Self::Channel => &event.channel,
        }
    }
}

/// Running per-case state within one partition.
#[derive(Debug, Clone, Copy, Default)]
struct CaseAccumulator {
    is_consultation: bool,
    has_negative: bool,
    tags: TagSet,
    consult_tags: TagSet,
}

impl CaseAccumulator {
    fn absorb(&mut self, event: &CallEvent) {
        let consultation = event.dialogue_type == DialogueType::Consultation;
        if consultation {
            self.is_consultation = true;
        }
        if let Some(tag) = tags::resolve_negative_tag(&event.metric, &event.tag) {
            self.has_negative = true;
            self.tags.insert(tag);
            if consultation {
                self.consult_tags.insert(tag);
            }
        }
    }
}

/// Case-level statistics of one partition (a time bucket or a domain).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RollupStats {
    /// Distinct cases seen in the partition.
    pub total_calls: u64,
    /// Distinct cases with at least one negative tag.
    pub problem_calls_unique: u64,
    /// Distinct cases per indicator.
    pub tag_counts: TagCounts,
    /// Parallel track restricted to consultation cases.
    pub consult_total_calls: u64,
    pub consult_problem_unique: u64,
    pub consult_tag_counts: TagCounts,
}

impl RollupStats {
    fn from_cases<'a>(cases: impl Iterator<Item = &'a CaseAccumulator>) -> Self {
        let mut stats = RollupStats::default();
        for case in cases {
            stats.total_calls += 1;
            if case.has_negative {
                stats.problem_calls_unique += 1;
            }
            if case.is_consultation {
                stats.consult_total_calls += 1;
                if case.consult_tags.any() {
                    stats.consult_problem_unique += 1;
                }
            }
            for tag in NegativeTag::ALL {
                if case.tags.contains(tag) {
                    stats.tag_counts.bump(tag);
                }
                if case.consult_tags.contains(tag) {
                    stats.consult_tag_counts.bump(tag);
                }
            }
        }
        stats
    }

    /// Share of the partition's cases carrying `tag`, as a fraction in
    /// [0, 1]. Zero for an empty partition — never a division by zero.
    pub fn case_share(&self, tag: NegativeTag) -> f64 {
        if self.total_calls == 0 {
            0.0
        } else {
            self.tag_counts.get(tag) as f64 / self.total_calls as f64
        }
    }

    /// Problem-case rate in percent. Zero for an empty partition.
    pub fn problem_rate_pct(&self) -> f64 {
        if self.total_calls == 0 {
            0.0
        } else {
            self.problem_calls_unique as f64 / self.total_calls as f64 * 100.0
        }
    }
}

/// Group events into time buckets and summarize each bucket's cases.
/// Events whose date fails to parse are excluded — not an error.
pub fn rollup_by_bucket<'a, I>(events: I, granularity: Granularity) -> BTreeMap<String, RollupStats>
where
    I: IntoIterator<Item = &'a CallEvent>,
{
    let mut partitions: BTreeMap<String, HashMap<&'a str, CaseAccumulator>> = BTreeMap::new();
    for event in events {
        let Some(key) = dates::bucket_key(&event.date, granularity) else {
            log::debug!("rollup: skipping event {} with unparseable date '{}'", event.id, event.date);
            continue;
        };
        partitions
            .entry(key)
            .or_default()
            .entry(event.case_id.as_str())
            .or_default()
            .absorb(event);
    }
    summarize(partitions)
}

/// Group events by a categorical dimension and summarize each domain's
/// cases. The partition key does not depend on the date, so events with
/// unparseable dates still count here.
pub fn rollup_by_domain<'a, I>(
    events: I,
    dimension: DomainDimension,
) -> BTreeMap<String, RollupStats>
where
    I: IntoIterator<Item = &'a CallEvent>,
{
    let mut partitions: BTreeMap<String, HashMap<&'a str, CaseAccumulator>> = BTreeMap::new();
    for event in events {
        partitions
            .entry(dimension.key_of(event).to_string())
            .or_default()
            .entry(event.case_id.as_str())
            .or_default()
            .absorb(event);
    }
    summarize(partitions)
}

fn summarize(
    partitions: BTreeMap<String, HashMap<&str, CaseAccumulator>>,
) -> BTreeMap<String, RollupStats> {
    partitions
        .into_iter()
        .map(|(key, cases)| (key, RollupStats::from_cases(cases.values())))
        .collect()
}
