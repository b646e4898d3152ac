//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logs and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "collateral-pool".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `POOL_SERVICE_NAME`: Service name (default: collateral-pool)
    /// - `POOL_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `POOL_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `POOL_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("POOL_SERVICE_NAME")
                .unwrap_or_else(|_| "collateral-pool".to_string()),

            log_level: env::var("POOL_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("POOL_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: env::var("POOL_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),
        }
    }

    /// Configuration for one named pool instance.
    pub fn for_pool(pool_name: &str) -> Self {
        let mut config = Self::from_env();
        config.service_name = format!("collateral-pool-{}", pool_name);
        config
    }
}
