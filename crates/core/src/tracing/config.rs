//! Configuration for tracing and instrumentation

use serde::{Deserialize, Serialize};

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "usina=debug,tower_http=info";

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Main instrumentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentationConfig {
    /// Service name for tracing
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Log level filter (e.g., "info", "debug", "usina=trace")
    pub log_level: String,
    /// Line format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            service_name: "usina".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl InstrumentationConfig {
    /// Create configuration from environment variables
    ///
    /// Supports the following environment variables:
    /// - `SERVICE_NAME`: Service name
    /// - `RUST_LOG`: Log level filter
    /// - `USINA_LOG_FORMAT`: `pretty` or `json`
    pub fn from_env() -> Self {
        let service_name = std::env::var("SERVICE_NAME").unwrap_or_else(|_| "usina".to_string());

        let log_level =
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        let format = match std::env::var("USINA_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self {
            service_name,
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level,
            format,
        }
    }
}
