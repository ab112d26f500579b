//! Configuration types for kalshi-book

use crate::feed::{FeedClientConfig, KALSHI_WS_URL};
use crate::rest::{RestConfig, KALSHI_REST_URL};
use crate::telemetry::LogFormat;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Exchange endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// WebSocket endpoint for streaming
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    /// REST base URL for polling
    #[serde(default = "default_rest_url")]
    pub rest_url: String,

    /// Per-request REST timeout (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Extra headers sent with the WebSocket handshake
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Streaming feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Handshake timeout (seconds)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Keepalive ping interval (seconds)
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,

    /// Time allowed for a pong reply (seconds)
    #[serde(default = "default_pong_timeout_secs")]
    pub pong_timeout_secs: u64,

    /// Books buffered between the feed and its consumer
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// First resubscription delay after a fault (milliseconds)
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Cap on the resubscription delay (milliseconds)
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Prometheus exporter port; no exporter when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_ws_url() -> String {
    KALSHI_WS_URL.to_string()
}
fn default_rest_url() -> String {
    KALSHI_REST_URL.to_string()
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_connect_timeout_secs() -> u64 {
    10
}
fn default_ping_interval_secs() -> u64 {
    10
}
fn default_pong_timeout_secs() -> u64 {
    10
}
fn default_buffer_size() -> usize {
    1
}
fn default_initial_backoff_ms() -> u64 {
    500
}
fn default_max_backoff_ms() -> u64 {
    30_000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            rest_url: default_rest_url(),
            request_timeout_secs: default_request_timeout_secs(),
            headers: BTreeMap::new(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            ping_interval_secs: default_ping_interval_secs(),
            pong_timeout_secs: default_pong_timeout_secs(),
            buffer_size: default_buffer_size(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: None,
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Reject settings the clients cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.feed.ping_interval_secs == 0 {
            anyhow::bail!("feed.ping_interval_secs must be at least 1");
        }
        if self.feed.pong_timeout_secs == 0 {
            anyhow::bail!("feed.pong_timeout_secs must be at least 1");
        }
        if self.feed.initial_backoff_ms == 0 {
            anyhow::bail!("feed.initial_backoff_ms must be at least 1");
        }
        if self.feed.max_backoff_ms < self.feed.initial_backoff_ms {
            anyhow::bail!(
                "feed.max_backoff_ms ({}) is below feed.initial_backoff_ms ({})",
                self.feed.max_backoff_ms,
                self.feed.initial_backoff_ms
            );
        }
        Ok(())
    }

    /// Settings for the streaming client
    pub fn feed_client(&self) -> FeedClientConfig {
        FeedClientConfig {
            ws_url: self.api.ws_url.clone(),
            headers: self
                .api
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            connect_timeout: Duration::from_secs(self.feed.connect_timeout_secs),
            ping_interval: Duration::from_secs(self.feed.ping_interval_secs),
            pong_timeout: Duration::from_secs(self.feed.pong_timeout_secs),
            buffer_size: self.feed.buffer_size.max(1),
        }
    }

    /// Settings for the polling client
    pub fn rest_client(&self) -> RestConfig {
        RestConfig {
            base_url: self.api.rest_url.clone(),
            timeout: Duration::from_secs(self.api.request_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            [api]
            ws_url = "wss://demo-api.kalshi.co/trade-api/ws/v2"
            rest_url = "https://demo-api.kalshi.co/trade-api/v2"
            request_timeout_secs = 5

            [api.headers]
            KALSHI-ACCESS-KEY = "abc"

            [feed]
            ping_interval_secs = 15
            buffer_size = 8
            max_backoff_ms = 10000

            [telemetry]
            metrics_port = 9090
            log_level = "debug"
            log_format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.request_timeout_secs, 5);
        assert_eq!(config.api.headers.get("KALSHI-ACCESS-KEY").unwrap(), "abc");
        assert_eq!(config.feed.ping_interval_secs, 15);
        assert_eq!(config.feed.connect_timeout_secs, 10);
        assert_eq!(config.feed.buffer_size, 8);
        assert_eq!(config.telemetry.metrics_port, Some(9090));
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api.ws_url, KALSHI_WS_URL);
        assert_eq!(config.api.rest_url, KALSHI_REST_URL);
        assert_eq!(config.feed.buffer_size, 1);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.telemetry.metrics_port.is_none());
    }

    #[test]
    fn test_client_configs() {
        let mut config = Config::default();
        config.feed.buffer_size = 0;
        config.feed.pong_timeout_secs = 3;
        config
            .api
            .headers
            .insert("X-Test".to_string(), "1".to_string());

        let feed = config.feed_client();
        assert_eq!(feed.buffer_size, 1);
        assert_eq!(feed.pong_timeout, Duration::from_secs(3));
        assert_eq!(feed.headers, vec![("X-Test".to_string(), "1".to_string())]);

        let rest = config.rest_client();
        assert_eq!(rest.base_url, KALSHI_REST_URL);
        assert_eq!(rest.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.feed.ping_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.feed.pong_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.feed.initial_backoff_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.feed.max_backoff_ms = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(Config::load("/nonexistent/kalshi-book.toml").is_err());
    }
}
