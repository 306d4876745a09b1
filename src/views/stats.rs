use super::{Panel, Shared, ViewState, header};
use crate::api::DataSource;
use crate::models::MetricsSnapshot;
use crate::poller::{PollHandle, spawn_poll};
use std::sync::Arc;
use std::time::Duration;

const GAUGE_WIDTH: usize = 20;

/// Shown when the server reports a zero or missing CPU reading
pub const DEFAULT_CPU: f64 = 30.0;

/// Shown when the server reports a zero or missing RAM reading
pub const DEFAULT_RAM: f64 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatsReading {
    pub cpu: f64,
    pub ram: f64,
}

impl StatsReading {
    pub fn from_snapshot(snapshot: &MetricsSnapshot) -> Self {
        Self {
            cpu: or_default(snapshot.cpu, DEFAULT_CPU),
            ram: or_default(snapshot.ram, DEFAULT_RAM),
        }
    }
}

fn or_default(value: f64, default: f64) -> f64 {
    if value == 0.0 || value.is_nan() { default } else { value }
}

/// Gauge fill in percent, clamped to [0, 100]
pub fn gauge_fill(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

fn gauge(label: &str, value: f64) -> String {
    let filled = (gauge_fill(value) / 100.0 * GAUGE_WIDTH as f64).round() as usize;
    format!(
        "{:<4} [{}{}] {}%",
        label,
        "#".repeat(filled),
        ".".repeat(GAUGE_WIDTH - filled),
        value
    )
}

/// CPU and RAM gauges
pub struct SystemStatsView {
    source: Arc<dyn DataSource>,
    state: Shared<StatsReading>,
}

impl SystemStatsView {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            state: Shared::new(StatsReading { cpu: 0.0, ram: 0.0 }),
        }
    }

    pub async fn refresh(&self) {
        let fetched = self.source.get_metrics().await;
        self.state.apply(fetched.map(|m| StatsReading::from_snapshot(&m)));
    }

    pub fn state(&self) -> ViewState<StatsReading> {
        self.state.get()
    }
}

impl Panel for SystemStatsView {
    fn title(&self) -> &'static str {
        "System Stats"
    }

    fn start(&self, period: Duration) -> PollHandle {
        let source = Arc::clone(&self.source);
        let state = self.state.clone();

        spawn_poll(
            "stats",
            period,
            move || {
                let source = Arc::clone(&source);
                async move {
                    source
                        .get_metrics()
                        .await
                        .map(|m| StatsReading::from_snapshot(&m))
                }
            },
            move |fetched| state.apply(fetched),
        )
    }

    fn render(&self) -> String {
        let state = self.state.get();
        format!(
            "{}\n{}\n{}\n",
            header(self.title(), &state),
            gauge("CPU", state.data.cpu),
            gauge("RAM", state.data.ram)
        )
    }
}
