//! Proxy Dashboard Client Library
//!
//! This library provides typed access to a caching proxy's HTTP API
//! (metrics, request logs, domain blacklist) and headless dashboard panels
//! that poll it on independent, cancellable timers.

pub mod api;
pub mod config;
pub mod errors;
pub mod fallback;
pub mod models;
pub mod notifications;
pub mod poller;
pub mod views;

pub use api::{ApiClient, DataSource, Fetched};
pub use config::Config;
pub use errors::{DashboardError, Result};
pub use models::{BlacklistEntry, LogEntry, MetricsSnapshot};
pub use poller::{PollHandle, spawn_poll};
pub use views::Dashboard;
