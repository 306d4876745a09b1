//! Payloads exchanged with the proxy API

use serde::{Deserialize, Deserializer, Serialize};

/// Days in the activity heatmap
pub const HEATMAP_DAYS: usize = 7;

/// Hours in the activity heatmap
pub const HEATMAP_HOURS: usize = 24;

/// A blacklisted domain or host
pub type BlacklistEntry = String;

/// Weekday × hour hit counts
pub type Heatmap = Vec<Vec<u32>>;

/// One point of the requests-per-second series
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RpsPoint {
    #[serde(deserialize_with = "string_or_number")]
    pub t: String,
    pub v: f64,
}

/// One point of the round-trip-time series, `rtt` is seconds as text
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RttPoint {
    #[serde(deserialize_with = "string_or_number")]
    pub t: String,
    #[serde(deserialize_with = "string_or_number")]
    pub rtt: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    #[serde(rename = "rpsSeries")]
    pub rps_series: Vec<RpsPoint>,
    pub timeseries: Vec<RttPoint>,
    pub cpu: f64,
    pub ram: f64,
    pub heatmap: Heatmap,
}

impl MetricsSnapshot {
    /// Share of requests answered from cache, as a percentage
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            return 0.0;
        }
        (self.cache_hits as f64 / lookups as f64) * 100.0
    }

    /// Whether the heatmap is a full weekday × hour grid
    pub fn has_full_heatmap(&self) -> bool {
        self.heatmap.len() == HEATMAP_DAYS
            && self.heatmap.iter().all(|row| row.len() == HEATMAP_HOURS)
    }
}

/// A single proxied request as recorded by the backend
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    #[serde(default, alias = "time", deserialize_with = "string_or_number")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "client_address")]
    pub client: Vec<String>,
    #[serde(default, alias = "url", deserialize_with = "string_or_number")]
    pub host: String,
}

impl LogEntry {
    /// Client identifier shown in the logs table
    pub fn client_id(&self) -> &str {
        self.client.first().map(String::as_str).unwrap_or("-")
    }

    pub fn display_time(&self) -> &str {
        placeholder(&self.timestamp)
    }

    pub fn display_host(&self) -> &str {
        placeholder(&self.host)
    }
}

/// Body of blacklist mutations
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HostPayload {
    pub host: String,
}

impl HostPayload {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

fn placeholder(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

/// Accept a JSON string or number and keep it as text
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
        Raw::Null(()) => String::new(),
    })
}

/// Accept the client address in any shape the proxy records it: a
/// `[host, port]` tuple with a numeric port, a bare string, or `null`
fn client_address<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    fn text(value: serde_json::Value) -> String {
        match value {
            serde_json::Value::String(text) => text,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::Array(parts) => parts.into_iter().map(text).collect(),
        other => vec![text(other)],
    })
}
