//! report-runner: headless analytics runner for CallPulse.
//!
//! Usage:
//!   report-runner --seed 12345 --days 90 --granularity week
//!   report-runner --csv events.csv --granularity month --product-group "Ипотека"

mod ingest;

use anyhow::Result;
use callpulse_core::{
    assembly::{self, Analytics, Filter},
    config::GeneratorConfig,
    dates::{self, DateRange, Granularity},
    generator,
    overlap::{OverlapAnalytics, ZoneCutoffs},
};
use std::env;
use std::path::Path;

/// Default overlap cut points, in percent of cases per indicator.
const OVERLAP_GREEN_MAX_PCT: f64 = 5.0;
const OVERLAP_RED_MIN_PCT: f64 = 12.0;

#[derive(serde::Serialize)]
struct Report {
    analytics: Analytics,
    overlap: OverlapAnalytics,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let days = parse_arg(&args, "--days", 90u64).max(1);
    let granularity = match str_arg(&args, "--granularity").as_deref() {
        Some("week") => Granularity::Week,
        Some("month") => Granularity::Month,
        _ => Granularity::Day,
    };
    let pretty = args.iter().any(|arg| arg == "--pretty");

    let config = match str_arg(&args, "--config") {
        Some(path) => GeneratorConfig::load(&path)?,
        None => GeneratorConfig::default_profile(),
    };

    let (events, range) = match str_arg(&args, "--csv") {
        Some(path) => {
            let events = ingest::read_events_csv(Path::new(&path))?;
            (events, DateRange::default())
        }
        None => {
            let to = chrono::Utc::now().date_naive();
            let from = to - chrono::Duration::days(days.saturating_sub(1) as i64);
            let from_key = dates::format_day_key(from);
            let to_key = dates::format_day_key(to);
            log::info!("report-runner: generating {from_key}..{to_key} with seed {seed}");
            let events = generator::generate_events(&config, &from_key, &to_key, seed);
            (events, DateRange::new(&from_key, &to_key))
        }
    };

    let filter = Filter {
        sector: str_arg(&args, "--sector"),
        product_group: str_arg(&args, "--product-group"),
        range,
    };

    let analytics = assembly::build_analytics(&events, &filter, granularity);
    let overlap = assembly::tag_overlap(
        &events,
        &filter,
        granularity,
        &ZoneCutoffs {
            green_max: OVERLAP_GREEN_MAX_PCT,
            red_min: OVERLAP_RED_MIN_PCT,
        },
    );

    let report = Report { analytics, overlap };
    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], name: &str, default: T) -> T {
    args.windows(2)
        .find(|pair| pair[0] == name)
        .and_then(|pair| pair[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg(args: &[String], name: &str) -> Option<String> {
    args.windows(2)
        .find(|pair| pair[0] == name)
        .map(|pair| pair[1].clone())
}
