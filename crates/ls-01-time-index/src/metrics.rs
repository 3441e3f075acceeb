//! # Time Index Metrics
//!
//! Prometheus metrics for the source sync loops.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! ls-01-time-index = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `time_index_observations_total` - Observations merged, by outcome
//! - `time_index_source_errors_total` - Transient source failures, by source
//! - `time_index_source_cursor` - Last synced block, by source
//! - `time_index_disagreements_total` - Irreconcilable source disagreements

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge_vec, IntCounter,
    IntCounterVec, IntGaugeVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Observations merged, labeled by outcome (created/confirmed/duplicate)
    pub static ref OBSERVATIONS: IntCounterVec = register_int_counter_vec!(
        "time_index_observations_total",
        "Total number of source observations merged into the index",
        &["outcome"]
    )
    .expect("Failed to create OBSERVATIONS metric");

    /// Transient source failures, labeled by source
    pub static ref SOURCE_ERRORS: IntCounterVec = register_int_counter_vec!(
        "time_index_source_errors_total",
        "Total number of transient chain-data source failures",
        &["source"]
    )
    .expect("Failed to create SOURCE_ERRORS metric");

    /// Last synced block, labeled by source
    pub static ref SOURCE_CURSOR: IntGaugeVec = register_int_gauge_vec!(
        "time_index_source_cursor",
        "Last block height synced from each source",
        &["source"]
    )
    .expect("Failed to create SOURCE_CURSOR metric");

    /// Irreconcilable disagreements
    pub static ref DISAGREEMENTS: IntCounter = register_int_counter!(
        "time_index_disagreements_total",
        "Total number of irreconcilable source disagreements"
    )
    .expect("Failed to create DISAGREEMENTS metric");
}

#[cfg(feature = "metrics")]
pub fn record_observation(outcome: &str) {
    OBSERVATIONS.with_label_values(&[outcome]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_source_error(source: &str) {
    SOURCE_ERRORS.with_label_values(&[source]).inc();
}

#[cfg(feature = "metrics")]
pub fn set_source_cursor(source: &str, height: u64) {
    SOURCE_CURSOR
        .with_label_values(&[source])
        .set(i64::try_from(height).unwrap_or(i64::MAX));
}

#[cfg(feature = "metrics")]
pub fn record_disagreement() {
    DISAGREEMENTS.inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_observation(_outcome: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_source_error(_source: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn set_source_cursor(_source: &str, _height: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_disagreement() {}
