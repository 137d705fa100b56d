//! Readiness classification and aggregation for the psychometric readiness
//! dashboard: score buckets, alert derivation, trend summaries and team
//! rollups, plus the CSV and report edges the CLI uses.

pub mod alerts;
pub mod classify;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod report;
pub mod seed;
pub mod team;
pub mod trend;

pub use error::{ReadinessError, Result};
