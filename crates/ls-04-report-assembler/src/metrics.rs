//! # Report Assembler Metrics
//!
//! Enable with the `metrics` feature.
//!
//! - `report_bundles_total` - Bundles finished, by outcome
//! - `report_proofs_received_total` - Gossiped proofs, by result
//! - `report_ledger_retries_total` - Retried ledger calls
//! - `report_bundle_duration_seconds` - Wall time per bundle
//! - `report_bus_events_lagged_total` - Bus events lost by the assembler's subscription

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref BUNDLES: IntCounterVec = register_int_counter_vec!(
        "report_bundles_total",
        "Total number of bundles finished",
        &["outcome"]
    )
    .expect("Failed to create BUNDLES metric");

    pub static ref PROOFS_RECEIVED: IntCounterVec = register_int_counter_vec!(
        "report_proofs_received_total",
        "Total number of proofs of report received",
        &["result"]
    )
    .expect("Failed to create PROOFS_RECEIVED metric");

    pub static ref LEDGER_RETRIES: IntCounter = register_int_counter!(
        "report_ledger_retries_total",
        "Total number of retried ledger calls"
    )
    .expect("Failed to create LEDGER_RETRIES metric");

    pub static ref BUNDLE_DURATION: Histogram = register_histogram!(
        "report_bundle_duration_seconds",
        "Time from bundle start to submission or abstention",
        vec![0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 120.0, 300.0, 600.0]
    )
    .expect("Failed to create BUNDLE_DURATION metric");

    pub static ref EVENTS_LAGGED: IntCounter = register_int_counter!(
        "report_bus_events_lagged_total",
        "Total number of bus events lost by a lagging assembler subscription"
    )
    .expect("Failed to create EVENTS_LAGGED metric");
}

#[cfg(feature = "metrics")]
pub fn record_bundle_outcome(outcome: &str) {
    BUNDLES.with_label_values(&[outcome]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_proof(result: &str) {
    PROOFS_RECEIVED.with_label_values(&[result]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_ledger_retry() {
    LEDGER_RETRIES.inc();
}

#[cfg(feature = "metrics")]
pub fn record_bundle_duration(seconds: f64) {
    BUNDLE_DURATION.observe(seconds);
}

#[cfg(feature = "metrics")]
pub fn record_events_lagged(count: u64) {
    EVENTS_LAGGED.inc_by(count);
}

#[cfg(not(feature = "metrics"))]
pub fn record_bundle_outcome(_outcome: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_proof(_result: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_ledger_retry() {}

#[cfg(not(feature = "metrics"))]
pub fn record_bundle_duration(_seconds: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_events_lagged(_count: u64) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorders_never_panic() {
        record_bundle_outcome("submitted");
        record_proof("accepted");
        record_ledger_retry();
        record_bundle_duration(0.25);
        record_events_lagged(3);
    }
}
