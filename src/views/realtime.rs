use super::{Panel, Shared, ViewState, header};
use crate::api::DataSource;
use crate::models::RpsPoint;
use crate::poller::{PollHandle, spawn_poll};
use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;

const MAX_BAR: usize = 50;

/// Live requests-per-second series
pub struct RealTimeView {
    source: Arc<dyn DataSource>,
    state: Shared<Vec<RpsPoint>>,
}

impl RealTimeView {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            state: Shared::new(Vec::new()),
        }
    }

    pub async fn refresh(&self) {
        let fetched = self.source.get_metrics().await;
        self.state.apply(fetched.map(|m| m.rps_series));
    }

    pub fn state(&self) -> ViewState<Vec<RpsPoint>> {
        self.state.get()
    }
}

impl Panel for RealTimeView {
    fn title(&self) -> &'static str {
        "Real-time Requests (req/sec)"
    }

    fn start(&self, period: Duration) -> PollHandle {
        let source = Arc::clone(&self.source);
        let state = self.state.clone();

        spawn_poll(
            "realtime",
            period,
            move || {
                let source = Arc::clone(&source);
                async move { source.get_metrics().await.map(|m| m.rps_series) }
            },
            move |fetched| state.apply(fetched),
        )
    }

    fn render(&self) -> String {
        let state = self.state.get();
        let mut out = header(self.title(), &state);
        out.push('\n');

        for point in &state.data {
            let width = point.v.max(0.0).round() as usize;
            let _ = writeln!(out, "{:>6} {:>7.1} {}", point.t, point.v, "#".repeat(width.min(MAX_BAR)));
        }

        out
    }
}
