//! Configuration management for the UsinaSoft web front-end

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Prefix of environment overrides, e.g. `USINA__UPSTREAM__BASE_URL`
pub const ENV_PREFIX: &str = "USINA";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream REST API
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Browser sessions
    #[serde(default)]
    pub session: SessionConfig,
}

/// Listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served under `/public`
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

/// Upstream API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Longest accepted session idle timeout, one year
pub const MAX_IDLE_TIMEOUT_HOURS: u64 = 24 * 365;

/// Session cookie and store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Idle time after which a session is dropped
    #[serde(default = "default_idle_timeout_hours")]
    pub idle_timeout_hours: u64,
    /// Only send the cookie over HTTPS
    #[serde(default)]
    pub secure_cookie: bool,
    /// How often idle sessions are purged
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_cookie_name() -> String {
    "usina.sid".to_string()
}

fn default_idle_timeout_hours() -> u64 {
    24
}

fn default_purge_interval_secs() -> u64 {
    300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            idle_timeout_hours: default_idle_timeout_hours(),
            secure_cookie: false,
            purge_interval_secs: default_purge_interval_secs(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Message(format!("invalid server address: {e}")))
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl SessionConfig {
    /// Idle timeout in hours, capped at [`MAX_IDLE_TIMEOUT_HOURS`]
    pub fn idle_hours(&self) -> i64 {
        i64::try_from(self.idle_timeout_hours.min(MAX_IDLE_TIMEOUT_HOURS)).unwrap_or(i64::MAX)
    }

    pub fn idle_timeout(&self) -> chrono::Duration {
        chrono::Duration::hours(self.idle_hours())
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs)
    }
}

impl Settings {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Start with defaults
        builder = builder.add_source(Config::try_from(&Settings::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }

        // Environment overrides file settings
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream.base_url.trim().is_empty() {
            return Err(ConfigError::Message(
                "upstream.base_url must not be empty".to_string(),
            ));
        }
        if self.upstream.timeout_ms == 0 {
            return Err(ConfigError::Message(
                "upstream.timeout_ms must be positive".to_string(),
            ));
        }
        if self.session.cookie_name.trim().is_empty() {
            return Err(ConfigError::Message(
                "session.cookie_name must not be empty".to_string(),
            ));
        }
        if self.session.idle_timeout_hours == 0 || self.session.purge_interval_secs == 0 {
            return Err(ConfigError::Message(
                "session timeouts must be positive".to_string(),
            ));
        }
        if self.session.idle_timeout_hours > MAX_IDLE_TIMEOUT_HOURS {
            return Err(ConfigError::Message(format!(
                "session.idle_timeout_hours must be at most {MAX_IDLE_TIMEOUT_HOURS}"
            )));
        }
        self.server.bind_addr()?;
        Ok(())
    }
}
