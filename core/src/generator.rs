//! Synthetic event-stream generator.
//!
//! Produces a deterministic, scenario-weighted event stream for demos and
//! test fixtures. Multiple tags on one case become multiple events sharing
//! the case id — the contract every consumer of `CallEvent` relies on.
//!
//! Nothing in the aggregation pipeline depends on this module's internals;
//! it is a producer like spreadsheet ingestion.

use crate::{
    config::GeneratorConfig,
    dates,
    event::{CallEvent, DialogueType},
    rng::{SampleRng, StreamSlot},
    tags::{NegativeTag, POSITIVE_METRICS},
};
use uuid::Uuid;

/// Metric emitted for cases that carry neither a negative tag nor a
/// positive signal. Unknown to the canonical set on purpose: the pipeline
/// must treat it as "no negative tag".
const NEUTRAL_METRIC: &str = "general_inquiry";

/// Generate the event stream for every day from `from` to `to` inclusive.
/// Same config + range + seed always reproduces the same events.
pub fn generate_events(
    config: &GeneratorConfig,
    from: &str,
    to: &str,
    master_seed: u64,
) -> Vec<CallEvent> {
    let days = dates::contiguous_day_keys(from, to);
    if days.is_empty() {
        log::warn!("generator: unusable date range {from}..{to}, producing no events");
        return Vec::new();
    }

    let mut volume_rng = SampleRng::new(master_seed, StreamSlot::Volume as u64);
    let mut case_rng = SampleRng::new(master_seed, StreamSlot::CaseMix as u64);
    let mut tag_rng = SampleRng::new(master_seed, StreamSlot::Tagging as u64);

    let sector_weights: Vec<f64> = config.sectors.iter().map(|s| s.weight).collect();
    let product_weights: Vec<f64> = config.product_groups.iter().map(|p| p.weight).collect();
    let channel_weights: Vec<f64> = config.channels.iter().map(|c| c.weight).collect();

    let mut events = Vec::new();
    for day in &days {
        // Daily volume jitters ±20% around the configured mean.
        let jitter = 0.8 + 0.4 * volume_rng.next_f64();
        let case_count = ((config.cases_per_day as f64) * jitter).round().max(1.0) as u64;

        for _ in 0..case_count {
            let case_id = stream_id(&mut case_rng);
            let sector = config.sectors[case_rng.weighted_index(&sector_weights)]
                .label
                .clone();
            let product_group = config.product_groups[case_rng.weighted_index(&product_weights)]
                .label
                .clone();
            let channel = config.channels[case_rng.weighted_index(&channel_weights)]
                .label
                .clone();
            let dialogue_type = if case_rng.chance(config.consultation_share) {
                DialogueType::Consultation
            } else {
                DialogueType::Claim
            };

            let mut push_event = |metric: &str, tag: &str, events: &mut Vec<CallEvent>| {
                events.push(CallEvent {
                    id: stream_id(&mut case_rng),
                    case_id: case_id.clone(),
                    date: day.clone(),
                    timestamp: None,
                    sector: sector.clone(),
                    product_group: product_group.clone(),
                    channel: channel.clone(),
                    dialogue_type,
                    metric: metric.to_string(),
                    tag: tag.to_string(),
                });
            };

            if tag_rng.chance(config.negative_share) {
                let weights = config.indicator_weights.as_array();
                let primary = NegativeTag::ALL[tag_rng.weighted_index(&weights)];
                push_event(primary.metric_name(), primary.label(), &mut events);

                if tag_rng.chance(config.second_tag_share) {
                    // A different indicator on the same case: second event,
                    // same case id.
                    let mut second_weights = weights;
                    for (slot, tag) in second_weights.iter_mut().zip(NegativeTag::ALL) {
                        if tag == primary {
                            *slot = 0.0;
                        }
                    }
                    let second = NegativeTag::ALL[tag_rng.weighted_index(&second_weights)];
                    if second != primary {
                        push_event(second.metric_name(), second.label(), &mut events);
                    }
                }
            } else if tag_rng.chance(config.positive_share) {
                let positive =
                    POSITIVE_METRICS[tag_rng.next_u64_below(POSITIVE_METRICS.len() as u64) as usize];
                push_event(positive, "", &mut events);
            } else {
                push_event(NEUTRAL_METRIC, "", &mut events);
            }
        }
    }

    log::info!(
        "generator: {} events across {} days (seed={master_seed})",
        events.len(),
        days.len(),
    );
    events
}

/// A uuid drawn from the deterministic stream, so ids replay with the seed.
fn stream_id(rng: &mut SampleRng) -> String {
    Uuid::from_u64_pair(rng.next_u64(), rng.next_u64()).to_string()
}
