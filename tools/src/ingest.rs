//! CSV ingestion — turns uploaded spreadsheet exports into canonical
//! events.
//!
//! Shape errors (structurally incomplete rows) are raised to the caller.
//! Data-level oddities — bad dates, unknown metrics or tags — pass through
//! untouched: the aggregation core excludes them per its tolerant policy.

use anyhow::{Context, Result};
use callpulse_core::event::{CallEvent, DialogueType};
use std::path::Path;

/// Expected header columns. Extra columns are ignored; a missing required
/// value surfaces as a shape error with the offending row number.
const COLUMNS: [&str; 9] = [
    "id",
    "case_id",
    "date",
    "sector",
    "product_group",
    "channel",
    "dialogue_type",
    "metric",
    "tag",
];

pub fn read_events_csv(path: &Path) -> Result<Vec<CallEvent>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;
    let headers = reader.headers().context("reading CSV header")?.clone();

    let position = |name: &str| headers.iter().position(|header| header == name);
    let columns: Vec<Option<usize>> = COLUMNS.iter().map(|name| position(name)).collect();

    let mut events = Vec::new();
    for (row_index, record) in reader.records().enumerate() {
        let row = row_index + 2; // 1-based, after the header line
        let record = record.with_context(|| format!("reading row {row}"))?;
        let field = |column: usize| -> String {
            columns[column]
                .and_then(|index| record.get(index))
                .unwrap_or("")
                .trim()
                .to_string()
        };

        let event = CallEvent {
            id: field(0),
            case_id: field(1),
            date: field(2),
            timestamp: None,
            sector: field(3),
            product_group: field(4),
            channel: field(5),
            dialogue_type: parse_dialogue_type(&field(6)),
            metric: field(7),
            tag: field(8),
        };
        event.validate().with_context(|| format!("row {row}"))?;
        events.push(event);
    }

    log::info!("ingest: {} events from {}", events.len(), path.display());
    Ok(events)
}

fn parse_dialogue_type(raw: &str) -> DialogueType {
    match raw.to_ascii_lowercase().as_str() {
        "consultation" | "консультация" => DialogueType::Consultation,
        _ => DialogueType::Claim,
    }
}
