//! Placeholder data substituted when the API is unavailable

use crate::models::{BlacklistEntry, Heatmap, LogEntry, MetricsSnapshot, RpsPoint, RttPoint};
use crate::models::{HEATMAP_DAYS, HEATMAP_HOURS};
use rand::Rng;

/// Points in each synthetic series
pub const SERIES_LEN: usize = 12;

pub const FALLBACK_TOTAL_REQUESTS: u64 = 1200;
pub const FALLBACK_CACHE_HITS: u64 = 900;
pub const FALLBACK_CACHE_MISSES: u64 = 300;
pub const FALLBACK_CPU: f64 = 34.0;
pub const FALLBACK_RAM: f64 = 62.0;

/// Blacklist shown while the API cannot be reached
pub const FALLBACK_BLACKLIST: [&str; 2] = ["facebook.com", "example.org"];

/// Synthesize a metrics snapshot, unseeded so every call differs
pub fn metrics() -> MetricsSnapshot {
    let mut rng = rand::rng();

    let rps_series = (0..SERIES_LEN)
        .map(|i| RpsPoint {
            t: i.to_string(),
            v: rng.random_range(5..25) as f64,
        })
        .collect();

    let timeseries = (0..SERIES_LEN)
        .map(|i| RttPoint {
            t: format!("{}:00", i),
            rtt: format!("{:.3}", rng.random_range(0.05..0.55)),
        })
        .collect();

    MetricsSnapshot {
        total_requests: FALLBACK_TOTAL_REQUESTS,
        cache_hits: FALLBACK_CACHE_HITS,
        cache_misses: FALLBACK_CACHE_MISSES,
        rps_series,
        timeseries,
        cpu: FALLBACK_CPU,
        ram: FALLBACK_RAM,
        heatmap: random_heatmap(&mut rng),
    }
}

/// Logs are never synthesized
pub fn logs() -> Vec<LogEntry> {
    Vec::new()
}

pub fn blacklist() -> Vec<BlacklistEntry> {
    FALLBACK_BLACKLIST.iter().map(|d| d.to_string()).collect()
}

/// All-zero weekday × hour grid
pub fn empty_heatmap() -> Heatmap {
    vec![vec![0; HEATMAP_HOURS]; HEATMAP_DAYS]
}

fn random_heatmap<R: Rng>(rng: &mut R) -> Heatmap {
    (0..HEATMAP_DAYS)
        .map(|_| (0..HEATMAP_HOURS).map(|_| rng.random_range(0..5)).collect())
        .collect()
}
