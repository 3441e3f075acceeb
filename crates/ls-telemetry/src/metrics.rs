//! Prometheus text exposition.
//!
//! Subsystem crates register their metrics against the default registry
//! (behind their `metrics` features); this module renders whatever has been
//! registered.

use prometheus::{Encoder, TextEncoder};

use crate::TelemetryError;

/// Encode all registered metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
