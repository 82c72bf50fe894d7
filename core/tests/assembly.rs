use callpulse_core::{
    assembly::{self, Filter, Trend},
    dates::{DateRange, Granularity},
    event::{CallEvent, DialogueType},
    overlap::ZoneCutoffs,
    scoring::{self, Zone},
    tags::{NegativeTag, TagCounts},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn event(id: &str, case_id: &str, date: &str, metric: &str, tag: &str) -> CallEvent {
    CallEvent {
        id: id.to_string(),
        case_id: case_id.to_string(),
        date: date.to_string(),
        timestamp: None,
        sector: "Розничный банк".to_string(),
        product_group: "Дебетовые карты".to_string(),
        channel: "Телефон".to_string(),
        dialogue_type: DialogueType::Claim,
        metric: metric.to_string(),
        tag: tag.to_string(),
    }
}

fn in_group(product_group: &str, base: CallEvent) -> CallEvent {
    CallEvent {
        product_group: product_group.to_string(),
        ..base
    }
}

fn all_time() -> Filter {
    Filter::default()
}

fn cutoffs() -> ZoneCutoffs {
    ZoneCutoffs {
        green_max: 5.0,
        red_min: 12.0,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// An empty event list after filtering produces empty buckets, domains and
/// drivers and an all-None summary — never an error.
#[test]
fn empty_input_yields_empty_well_typed_output() {
    let analytics = assembly::build_analytics(&[], &all_time(), Granularity::Day);

    assert!(analytics.buckets.is_empty());
    assert!(analytics.domains.is_empty());
    assert!(analytics.drivers.is_empty());
    assert!(analytics.summary.current.is_none());
    assert!(analytics.summary.previous.is_none());
    assert!(analytics.summary.delta.is_none());
}

/// A filter that matches nothing behaves exactly like empty input.
#[test]
fn fully_filtered_input_yields_empty_output() {
    let events = vec![event("e1", "case-1", "2025-01-10", "general_inquiry", "")];
    let filter = Filter {
        sector: Some("Премиум".to_string()),
        ..Filter::default()
    };

    let analytics = assembly::build_analytics(&events, &filter, Granularity::Day);
    assert!(analytics.buckets.is_empty());
    assert!(analytics.summary.delta.is_none());
}

/// With exactly one bucket the summary has a current but no previous and
/// no delta.
#[test]
fn single_bucket_summary_has_no_delta() {
    let events = vec![
        event("e1", "case-1", "2025-01-10", "unresolved_request", "Запрос не решен"),
        event("e2", "case-2", "2025-01-10", "general_inquiry", ""),
    ];

    let analytics = assembly::build_analytics(&events, &all_time(), Granularity::Day);

    assert_eq!(analytics.buckets.len(), 1);
    let summary = &analytics.summary;
    assert!(summary.current.is_some());
    assert!(summary.previous.is_none());
    assert!(summary.delta.is_none());
}

/// With two buckets the summary deltas are last minus previous.
#[test]
fn summary_deltas_compare_last_two_buckets() {
    let events = vec![
        event("e1", "case-1", "2025-01-10", "general_inquiry", ""),
        event("e2", "case-2", "2025-01-10", "general_inquiry", ""),
        event("e3", "case-3", "2025-01-11", "unresolved_request", "Запрос не решен"),
    ];

    let analytics = assembly::build_analytics(&events, &all_time(), Granularity::Day);
    let delta = analytics.summary.delta.expect("two buckets must produce a delta");

    assert_eq!(delta.volume_delta, -1); // 1 case today vs 2 yesterday
    assert_eq!(delta.problem_delta, 1);
    assert!(delta.rate_delta_pp > 0.0);
    assert!(delta.score_delta > 0.0);
}

/// Weights come from domain-level totals, once per call, and are the same
/// weights used on every bucket.
#[test]
fn weights_derive_from_domain_totals() {
    let events = vec![
        in_group(
            "Кредитные карты",
            event("e1", "case-1", "2025-01-10", "unresolved_request", "Запрос не решен"),
        ),
        in_group(
            "Ипотека",
            event("e2", "case-2", "2025-01-10", "unresolved_request", "Запрос не решен"),
        ),
        in_group(
            "Ипотека",
            event("e3", "case-3", "2025-01-11", "technical_failure", "Технические проблемы/сбои"),
        ),
    ];

    let analytics = assembly::build_analytics(&events, &all_time(), Granularity::Day);

    let mut totals = TagCounts::default();
    for domain in &analytics.domains {
        totals.add(&domain.tag_counts);
    }
    let expected = scoring::derive_weights(&totals);
    assert_eq!(analytics.weights, expected);
    // 2 unresolved vs 1 technical: technical weight is 2.0.
    assert!((analytics.weights.technical_failure - 2.0).abs() < 1e-9);
}

/// A bounded range zero-fills the bucket axis: days with no cases appear
/// as zero buckets classified green.
#[test]
fn bounded_range_zero_fills_the_axis() {
    let events = vec![
        event("e1", "case-1", "2025-01-10", "general_inquiry", ""),
        event("e2", "case-2", "2025-01-12", "general_inquiry", ""),
    ];
    let filter = Filter {
        range: DateRange::new("2025-01-09", "2025-01-13"),
        ..Filter::default()
    };

    let analytics = assembly::build_analytics(&events, &filter, Granularity::Day);

    let dates: Vec<&str> = analytics.buckets.iter().map(|b| b.date.as_str()).collect();
    assert_eq!(
        dates,
        vec!["2025-01-09", "2025-01-10", "2025-01-11", "2025-01-12", "2025-01-13"]
    );
    let empty_day = &analytics.buckets[2];
    assert_eq!(empty_day.total_calls, 0);
    assert_eq!(empty_day.score, 0.0);
    assert_eq!(empty_day.zone, Zone::Green);
}

/// Week granularity snaps the axis outward to full weeks.
#[test]
fn week_axis_snaps_outward() {
    let events = vec![event("e1", "case-1", "2025-01-15", "general_inquiry", "")];
    let filter = Filter {
        range: DateRange::new("2025-01-15", "2025-01-21"),
        ..Filter::default()
    };

    let analytics = assembly::build_analytics(&events, &filter, Granularity::Week);

    let dates: Vec<&str> = analytics.buckets.iter().map(|b| b.date.as_str()).collect();
    // 2025-01-15 is mid-week; the snapped axis starts Monday 2025-01-13
    // and covers the week of 2025-01-20 as well.
    assert_eq!(dates, vec!["2025-01-13", "2025-01-20"]);
}

/// A from-only range normalizes to that single day before filtering.
#[test]
fn from_only_range_selects_the_single_day() {
    let events = vec![
        event("e1", "case-1", "2025-01-15", "general_inquiry", ""),
        event("e2", "case-2", "2025-01-16", "general_inquiry", ""),
    ];
    let filter = Filter {
        range: DateRange::single("2025-01-15"),
        ..Filter::default()
    };

    let analytics = assembly::build_analytics(&events, &filter, Granularity::Day);
    assert_eq!(analytics.buckets.len(), 1);
    assert_eq!(analytics.buckets[0].date, "2025-01-15");
}

/// Sector and product-group filters intersect.
#[test]
fn dimension_filters_intersect() {
    let mut premium = event("e1", "case-1", "2025-01-10", "general_inquiry", "");
    premium.sector = "Премиум".to_string();
    let events = vec![
        premium,
        event("e2", "case-2", "2025-01-10", "general_inquiry", ""),
    ];
    let filter = Filter {
        sector: Some("Премиум".to_string()),
        product_group: Some("Дебетовые карты".to_string()),
        ..Filter::default()
    };

    let analytics = assembly::build_analytics(&events, &filter, Granularity::Day);
    assert_eq!(analytics.buckets.len(), 1);
    assert_eq!(analytics.buckets[0].total_calls, 1);
}

/// Domain points carry a top driver, or the sentinel when no tag leads.
#[test]
fn domain_top_driver_and_sentinel() {
    let events = vec![
        in_group(
            "Ипотека",
            event("e1", "case-1", "2025-01-10", "churn_threat", "Угроза ухода"),
        ),
        in_group(
            "Вклады",
            event("e2", "case-2", "2025-01-10", "general_inquiry", ""),
        ),
    ];

    let analytics = assembly::build_analytics(&events, &all_time(), Granularity::Day);

    let mortgage = analytics.domains.iter().find(|d| d.domain == "Ипотека").unwrap();
    assert_eq!(mortgage.top_driver, Some(NegativeTag::ChurnThreat));
    assert_eq!(mortgage.top_driver_label.as_deref(), Some("Угроза ухода"));

    let deposits = analytics.domains.iter().find(|d| d.domain == "Вклады").unwrap();
    assert_eq!(deposits.top_driver, None);
    assert_eq!(deposits.top_driver_label, None);
}

/// Driver rows aggregate the whole window, rank by contribution and apply
/// the ±0.2 pp dead zone to the trend.
#[test]
fn driver_rows_rank_and_classify_trend() {
    let events = vec![
        // Previous bucket: one unresolved, one technical.
        event("e1", "case-1", "2025-01-10", "unresolved_request", "Запрос не решен"),
        event("e2", "case-2", "2025-01-10", "technical_failure", "Технические проблемы/сбои"),
        // Current bucket: unresolved only.
        event("e3", "case-3", "2025-01-11", "unresolved_request", "Запрос не решен"),
    ];

    let analytics = assembly::build_analytics(&events, &all_time(), Granularity::Day);

    let top = &analytics.drivers[0];
    assert_eq!(top.tag, NegativeTag::UnresolvedRequest);
    // 2 of 3 assignments across the window.
    assert!((top.contribution_pct - 2.0 / 3.0 * 100.0).abs() < 1e-9);
    // 50% of assignments in the previous bucket, 100% in the current.
    assert!((top.previous_pct - 50.0).abs() < 1e-9);
    assert!((top.current_pct - 100.0).abs() < 1e-9);
    assert_eq!(top.trend, Trend::Up);

    let technical = analytics
        .drivers
        .iter()
        .find(|row| row.tag == NegativeTag::TechnicalFailure)
        .unwrap();
    assert_eq!(technical.trend, Trend::Down);

    let churn = analytics
        .drivers
        .iter()
        .find(|row| row.tag == NegativeTag::ChurnThreat)
        .unwrap();
    assert_eq!(churn.trend, Trend::Flat);
    assert_eq!(churn.contribution_pct, 0.0);
}

/// The tag overlap view feeds per-indicator rate series into the overlap
/// engine; indicators never observed are dropped as flat-zero series.
#[test]
fn tag_overlap_drops_unobserved_indicators() {
    let events = vec![
        event("e1", "case-1", "2025-01-13", "unresolved_request", "Запрос не решен"),
        event("e2", "case-2", "2025-01-14", "general_inquiry", ""),
    ];

    let overlap = assembly::tag_overlap(&events, &all_time(), Granularity::Week, &cutoffs());

    assert_eq!(overlap.snapshot.len(), 1);
    assert_eq!(overlap.snapshot[0].name, "Запрос не решен");
    assert_eq!(overlap.timeline.len(), 1);
}

/// The domain overlap view compares problem rates across domain values;
/// problem-free domains drop out as flat-zero series.
#[test]
fn domain_overlap_drops_problem_free_domains() {
    let events = vec![
        in_group(
            "Ипотека",
            event("e1", "case-1", "2025-01-13", "unresolved_request", "Запрос не решен"),
        ),
        in_group(
            "Ипотека",
            event("e2", "case-2", "2025-01-14", "general_inquiry", ""),
        ),
        in_group(
            "Вклады",
            event("e3", "case-3", "2025-01-13", "general_inquiry", ""),
        ),
    ];

    let overlap = assembly::domain_overlap(
        &events,
        &all_time(),
        callpulse_core::rollup::DomainDimension::ProductGroup,
        Granularity::Week,
        &cutoffs(),
    );

    assert_eq!(overlap.snapshot.len(), 1);
    assert_eq!(overlap.snapshot[0].name, "Ипотека");
    // One problem case out of two in the week of 2025-01-13, averaged over
    // the two observed days: (100 + 0) / 2.
    assert!((overlap.timeline[0].values[0] - 50.0).abs() < 1e-9);
}

/// Inputs are never mutated: the event slice is identical after the run.
#[test]
fn inputs_are_left_untouched() {
    let events = vec![
        event("e1", "case-1", "2025-01-10", "unresolved_request", "Запрос не решен"),
        event("e2", "case-2", "2025-01-11", "general_inquiry", ""),
    ];
    let snapshot = events.clone();

    let _ = assembly::build_analytics(&events, &all_time(), Granularity::Week);
    let _ = assembly::tag_overlap(&events, &all_time(), Granularity::Week, &cutoffs());

    assert_eq!(events, snapshot);
}

/// The whole result serializes to JSON — no interior identity to lose.
#[test]
fn analytics_serialize_to_json() {
    let events = vec![event("e1", "case-1", "2025-01-10", "churn_threat", "Угроза ухода")];
    let analytics = assembly::build_analytics(&events, &all_time(), Granularity::Day);

    let json = serde_json::to_string(&analytics).expect("analytics must serialize");
    assert!(json.contains("\"buckets\""));
    assert!(json.contains("\"drivers\""));
}
