//! The canonical event record — one tagged observation on a customer contact.
//!
//! RULE: producers (spreadsheet ingestion, the synthetic generator) emit
//! events in exactly this shape. A contact tagged with two problem
//! categories arrives as two events sharing `case_id`, never as one event
//! with a multi-valued tag field. Everything downstream deduplicates by
//! `case_id`.

use crate::{
    error::{PulseError, PulseResult},
    types::{CaseId, EventId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the contact was opened. Drives the parallel consultation-only rollup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueType {
    Consultation,
    Claim,
}

/// One tagged observation belonging to a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEvent {
    pub id: EventId,
    pub case_id: CaseId,
    /// Day key, `YYYY-MM-DD`. Kept raw: a malformed date is excluded from
    /// aggregation downstream, never rejected here.
    pub date: String,
    /// Optional full timestamp when the producer has one.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub sector: String,
    pub product_group: String,
    pub channel: String,
    pub dialogue_type: DialogueType,
    /// Indicator name. Open on the wire — ingestion may emit names outside
    /// the canonical set; resolution happens in `tags`.
    pub metric: String,
    /// Human-readable negative-indicator label, or empty for "no tag".
    #[serde(default)]
    pub tag: String,
}

impl CallEvent {
    /// Shape validation for producers. Data-level oddities (bad dates,
    /// unknown metrics) are NOT errors — only a structurally incomplete
    /// record is.
    pub fn validate(&self) -> PulseResult<()> {
        let record = if self.id.is_empty() {
            "<unidentified>".to_string()
        } else {
            self.id.clone()
        };
        if self.id.is_empty() {
            return Err(PulseError::MissingField { record, field: "id" });
        }
        if self.case_id.is_empty() {
            return Err(PulseError::MissingField {
                record,
                field: "case_id",
            });
        }
        if self.date.is_empty() {
            return Err(PulseError::MissingField {
                record,
                field: "date",
            });
        }
        Ok(())
    }
}
