//! # LS Telemetry
//!
//! Logging and metrics bootstrap shared by every report subsystem.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ls_telemetry::{init_telemetry, TelemetryConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(config).expect("Failed to init telemetry");
//!
//!     // Logs now flow through the configured subscriber
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LS_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `LS_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `LS_CONSOLE_OUTPUT` | `true` | Emit logs to stdout |
//! | `LS_NETWORK` | `testnet` | Network label |
//! | `LS_NODE_NAME` | `node` | Node label |

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_test_logging;
pub use metrics::gather_metrics;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to encode Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install the global subscriber.
///
/// Returns a guard that should be held for the lifetime of the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::init_logging(&config)?;

    tracing::info!(
        service = %config.full_service_name(),
        network = %config.network,
        json = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard {
        service: config.full_service_name(),
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service, "Shutting down telemetry");
    }
}
