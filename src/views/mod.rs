//! Headless dashboard panels
//!
//! Each panel owns its local state and overwrites it wholesale with every
//! poll result. Panels share nothing with one another, so two panels reading
//! the same endpoint issue independent requests.

mod blacklist;
mod heatmap;
mod logs;
mod realtime;
mod stats;

pub use blacklist::BlacklistManager;
pub use heatmap::HeatmapView;
pub use logs::LogsView;
pub use realtime::RealTimeView;
pub use stats::{StatsReading, SystemStatsView};

use crate::api::{DataSource, Fetched};
use crate::config::Config;
use crate::notifications::Notifications;
use crate::poller::PollHandle;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// A panel that refreshes itself on a timer
pub trait Panel: Send + Sync {
    fn title(&self) -> &'static str;

    /// Start polling; the returned handle stops it
    fn start(&self, period: Duration) -> PollHandle;

    fn render(&self) -> String;
}

/// Current contents of a panel
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
    pub data: T,
    /// Whether `data` came from the server rather than a fallback
    pub live: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Panel state shared between the panel and its poll task
#[derive(Debug)]
pub(crate) struct Shared<T> {
    inner: Arc<RwLock<ViewState<T>>>,
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> Shared<T> {
    pub(crate) fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ViewState {
                data: initial,
                live: false,
                updated_at: None,
            })),
        }
    }

    pub(crate) fn get(&self) -> ViewState<T> {
        self.read().clone()
    }

    pub(crate) fn apply(&self, fetched: Fetched<T>) {
        let live = fetched.is_live();
        let mut state = self.write();
        state.data = fetched.into_inner();
        state.live = live;
        state.updated_at = Some(Utc::now());
    }

    fn read(&self) -> RwLockReadGuard<'_, ViewState<T>> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ViewState<T>> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Title line shared by every panel
pub(crate) fn header<T>(title: &str, state: &ViewState<T>) -> String {
    match state.updated_at {
        None => format!("{} (loading)", title),
        Some(at) if state.live => format!("{} - updated {}", title, at.format("%H:%M:%S")),
        Some(at) => format!("{} - updated {} (fallback data)", title, at.format("%H:%M:%S")),
    }
}

/// Every panel of the dashboard wired to one data source
pub struct Dashboard {
    pub logs: LogsView,
    pub realtime: RealTimeView,
    pub stats: SystemStatsView,
    pub heatmap: HeatmapView,
    pub blacklist: BlacklistManager,
    pub notifications: Notifications,
    config: Config,
}

impl Dashboard {
    pub fn new(source: Arc<dyn DataSource>, config: Config) -> Self {
        let notifications = Notifications::new(32, config.notification_ttl);

        Self {
            logs: LogsView::new(Arc::clone(&source), config.logs_limit),
            realtime: RealTimeView::new(Arc::clone(&source)),
            stats: SystemStatsView::new(Arc::clone(&source)),
            heatmap: HeatmapView::new(Arc::clone(&source)),
            blacklist: BlacklistManager::new(source, notifications.clone()),
            notifications,
            config,
        }
    }

    /// Polling panels paired with their configured interval
    pub fn panels(&self) -> Vec<(&dyn Panel, Duration)> {
        vec![
            (&self.realtime as &dyn Panel, self.config.realtime_interval),
            (&self.logs as &dyn Panel, self.config.logs_interval),
            (&self.stats as &dyn Panel, self.config.stats_interval),
            (&self.heatmap as &dyn Panel, self.config.heatmap_interval),
        ]
    }

    pub fn start_all(&self) -> Vec<PollHandle> {
        self.panels()
            .into_iter()
            .map(|(panel, period)| panel.start(period))
            .collect()
    }
}
