//! callpulse-core — the aggregation/scoring pipeline behind the CallPulse
//! quality dashboard.
//!
//! The pipeline turns raw call events (one tagged observation per customer
//! contact) into the derived analytics the dashboard renders: per-bucket
//! time series, per-domain rollups, a weighted dissatisfaction score with
//! zone classification, and overlap analytics across indicators.
//!
//! Everything is synchronous and in-memory: each aggregation call is a
//! finite, CPU-bound pass over an event slice, recomputed from scratch on
//! every filter change. No state survives between calls.

pub mod assembly;
pub mod config;
pub mod dates;
pub mod error;
pub mod event;
pub mod generator;
pub mod overlap;
pub mod rng;
pub mod rollup;
pub mod scoring;
pub mod tags;
pub mod types;
