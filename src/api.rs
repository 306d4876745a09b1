//! HTTP access layer for the proxy API
//!
//! Every read collapses transport errors, non-2xx statuses and undecodable
//! bodies into a single "unavailable" outcome and substitutes a fallback
//! value. Writes report success as a plain `bool`.

use crate::config::Config;
use crate::errors::{DashboardError, Result};
use crate::fallback;
use crate::models::{BlacklistEntry, HostPayload, LogEntry, MetricsSnapshot};
use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

pub const METRICS_PATH: &str = "/api/metrics";
pub const LOGS_PATH: &str = "/api/logs";
pub const BLACKLIST_PATH: &str = "/api/blacklist";
pub const CACHE_CLEAR_PATH: &str = "/api/cache/clear";

/// Default number of log entries requested
pub const DEFAULT_LOGS_LIMIT: usize = 50;

/// Outcome of a read: data from the server, or a substituted fallback
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Live(T),
    Fallback(T),
}

impl<T> Fetched<T> {
    pub fn is_live(&self) -> bool {
        matches!(self, Fetched::Live(_))
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Fetched::Fallback(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Fetched::Live(value) | Fetched::Fallback(value) => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Fetched::Live(value) | Fetched::Fallback(value) => value,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Fetched<U> {
        match self {
            Fetched::Live(value) => Fetched::Live(f(value)),
            Fetched::Fallback(value) => Fetched::Fallback(f(value)),
        }
    }

    fn from_option(data: Option<T>, fallback: impl FnOnce() -> T) -> Self {
        match data {
            Some(value) => Fetched::Live(value),
            None => Fetched::Fallback(fallback()),
        }
    }
}

/// The six operations the dashboard views consume
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn get_metrics(&self) -> Fetched<MetricsSnapshot>;
    async fn get_logs(&self, limit: usize) -> Fetched<Vec<LogEntry>>;
    async fn get_blacklist(&self) -> Fetched<Vec<BlacklistEntry>>;
    async fn add_blacklist(&self, domain: &str) -> bool;
    async fn remove_blacklist(&self, domain: &str) -> bool;
    async fn clear_cache(&self) -> bool;
}

/// Client for the proxy's HTTP API
#[derive(Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    stats: AccessStats,
}

impl ApiClient {
    /// Create a client; `http_timeout` of `None` keeps reqwest's default
    pub fn new(base_url: impl Into<String>, http_timeout: Option<Duration>) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(format!("proxy_dashboard/{}", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = http_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(DashboardError::Http)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            stats: AccessStats::new(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate().map_err(DashboardError::Config)?;
        Self::new(config.normalized_base_url(), config.http_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one request and require a 2xx status
    async fn request(&self, method: Method, path: &str, body: Option<&HostPayload>) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut builder = self.client.request(method, &url);
        if let Some(payload) = body {
            builder = builder.json(payload);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Status(status.as_u16()));
        }

        Ok(response)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path, None).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// GET `path` and decode it, `None` on any failure
    async fn safe_get<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        let started = Instant::now();
        let result = self.fetch_json(path).await;
        self.stats.record(result.is_ok(), started.elapsed()).await;

        match result {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("API fallback for {}: {}", path, e);
                None
            }
        }
    }

    /// Send a mutation, `true` only on a 2xx status
    async fn send(&self, method: Method, path: &str, body: Option<&HostPayload>) -> bool {
        let started = Instant::now();
        let result = self.request(method.clone(), path, body).await;
        self.stats.record(result.is_ok(), started.elapsed()).await;

        match result {
            Ok(_) => true,
            Err(e) => {
                warn!("{} {} failed: {}", method, path, e);
                false
            }
        }
    }

    pub async fn stats(&self) -> AccessStatsSnapshot {
        self.stats.snapshot().await
    }
}

#[async_trait]
impl DataSource for ApiClient {
    async fn get_metrics(&self) -> Fetched<MetricsSnapshot> {
        let data = self.safe_get(METRICS_PATH).await;
        Fetched::from_option(data, fallback::metrics)
    }

    async fn get_logs(&self, limit: usize) -> Fetched<Vec<LogEntry>> {
        let path = format!("{}?limit={}", LOGS_PATH, limit);
        let data = self.safe_get::<Vec<LogEntry>>(&path).await.map(|mut logs| {
            logs.truncate(limit);
            logs
        });
        Fetched::from_option(data, fallback::logs)
    }

    async fn get_blacklist(&self) -> Fetched<Vec<BlacklistEntry>> {
        let data = self.safe_get(BLACKLIST_PATH).await;
        Fetched::from_option(data, fallback::blacklist)
    }

    async fn add_blacklist(&self, domain: &str) -> bool {
        let payload = HostPayload::new(domain);
        self.send(Method::POST, BLACKLIST_PATH, Some(&payload)).await
    }

    async fn remove_blacklist(&self, domain: &str) -> bool {
        let payload = HostPayload::new(domain);
        self.send(Method::DELETE, BLACKLIST_PATH, Some(&payload)).await
    }

    async fn clear_cache(&self) -> bool {
        self.send(Method::POST, CACHE_CLEAR_PATH, None).await
    }
}

/// Running counters over every call made by a client
#[derive(Debug)]
struct AccessStats {
    inner: RwLock<AccessCounters>,
}

#[derive(Debug, Default)]
struct AccessCounters {
    requests: u64,
    live: u64,
    unavailable: u64,
    total_duration: Duration,
}

impl AccessStats {
    fn new() -> Self {
        Self {
            inner: RwLock::new(AccessCounters::default()),
        }
    }

    async fn record(&self, live: bool, duration: Duration) {
        let mut counters = self.inner.write().await;
        counters.requests += 1;
        if live {
            counters.live += 1;
        } else {
            counters.unavailable += 1;
        }
        counters.total_duration += duration;
    }

    async fn snapshot(&self) -> AccessStatsSnapshot {
        let counters = self.inner.read().await;

        let avg_duration = if counters.requests > 0 {
            counters.total_duration / counters.requests as u32
        } else {
            Duration::ZERO
        };

        AccessStatsSnapshot {
            requests: counters.requests,
            live: counters.live,
            unavailable: counters.unavailable,
            avg_duration_ms: avg_duration.as_millis() as u64,
        }
    }
}

/// Snapshot of access statistics
#[derive(Debug, Clone, PartialEq)]
pub struct AccessStatsSnapshot {
    pub requests: u64,
    pub live: u64,
    pub unavailable: u64,
    pub avg_duration_ms: u64,
}

impl AccessStatsSnapshot {
    pub fn availability(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        (self.live as f64 / self.requests as f64) * 100.0
    }
}
