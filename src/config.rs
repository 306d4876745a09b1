//! Configuration management for the dashboard client

use crate::api::DEFAULT_LOGS_LIMIT;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root address of the proxy's HTTP API
    pub base_url: String,

    /// Optional per-request timeout, the HTTP client default applies when unset
    pub http_timeout: Option<Duration>,

    /// Number of log entries requested by the logs view
    pub logs_limit: usize,

    /// Poll interval of the real-time requests chart
    pub realtime_interval: Duration,

    /// Poll interval of the logs table
    pub logs_interval: Duration,

    /// Poll interval of the CPU/RAM gauges
    pub stats_interval: Duration,

    /// Poll interval of the activity heatmap
    pub heatmap_interval: Duration,

    /// How long a notification stays visible
    pub notification_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http_timeout: None,
            logs_limit: DEFAULT_LOGS_LIMIT,
            realtime_interval: Duration::from_millis(2000),
            logs_interval: Duration::from_millis(3000),
            stats_interval: Duration::from_millis(3000),
            heatmap_interval: Duration::from_millis(5000),
            notification_ttl: Duration::from_millis(4000),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(base_url) = lookup("API_BASE_URL") {
            config.base_url = base_url;
        }

        if let Some(timeout) = lookup("HTTP_TIMEOUT_SECONDS") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.http_timeout = Some(Duration::from_secs(seconds));
            }
        }

        if let Some(limit) = lookup("LOGS_LIMIT") {
            if let Ok(limit) = limit.parse() {
                config.logs_limit = limit;
            }
        }

        let millis = |key: &str| {
            lookup(key)
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_millis)
        };

        if let Some(interval) = millis("REALTIME_INTERVAL_MS") {
            config.realtime_interval = interval;
        }

        if let Some(interval) = millis("LOGS_INTERVAL_MS") {
            config.logs_interval = interval;
        }

        if let Some(interval) = millis("STATS_INTERVAL_MS") {
            config.stats_interval = interval;
        }

        if let Some(interval) = millis("HEATMAP_INTERVAL_MS") {
            config.heatmap_interval = interval;
        }

        if let Some(ttl) = millis("NOTIFICATION_TTL_MS") {
            config.notification_ttl = ttl;
        }

        config
    }

    /// Base URL without a trailing slash, ready for path concatenation
    pub fn normalized_base_url(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url cannot be empty".to_string());
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!("base_url must be an http(s) URL, got '{}'", self.base_url));
        }

        if self.logs_limit == 0 {
            return Err("logs_limit must be greater than 0".to_string());
        }

        let intervals = [
            ("realtime_interval", self.realtime_interval),
            ("logs_interval", self.logs_interval),
            ("stats_interval", self.stats_interval),
            ("heatmap_interval", self.heatmap_interval),
        ];

        for (name, interval) in intervals {
            if interval.is_zero() {
                return Err(format!("{} must be greater than 0", name));
            }
        }

        Ok(())
    }
}
