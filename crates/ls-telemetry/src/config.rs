//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Node name (distinguishes reporters running side by side)
    pub node_name: String,

    /// Log level filter (trace, debug, info, warn, error or a full directive)
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Network identifier (testnet, mainnet, devnet)
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "logstore-node".to_string(),
            node_name: "node".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            network: "testnet".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LS_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `LS_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `LS_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `LS_NETWORK`: Network name (default: testnet)
    /// - `LS_NODE_NAME`: Node name (default: node)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();
        let defaults = Self::default();

        Self {
            service_name: defaults.service_name,

            node_name: env::var("LS_NODE_NAME").unwrap_or(defaults.node_name),

            log_level: env::var("LS_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            console_output: env::var("LS_CONSOLE_OUTPUT")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),

            json_logs: env::var("LS_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(is_container),

            network: env::var("LS_NETWORK").unwrap_or(defaults.network),
        }
    }

    /// Configuration for a named node.
    pub fn for_node(node_name: &str) -> Self {
        let mut config = Self::from_env();
        config.node_name = node_name.to_string();
        config
    }

    /// Service name qualified with the node name.
    pub fn full_service_name(&self) -> String {
        format!("{}-{}", self.service_name, self.node_name)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
