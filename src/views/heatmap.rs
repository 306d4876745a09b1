use super::{Panel, Shared, ViewState, header};
use crate::api::DataSource;
use crate::fallback;
use crate::models::{Heatmap, MetricsSnapshot};
use crate::poller::{PollHandle, spawn_poll};
use chrono::Weekday;
use std::sync::Arc;
use std::time::Duration;

const SHADES: [char; 6] = [' ', '.', ':', '+', '*', '#'];

/// Intensity bucket of a cell, `min(5, floor(v * 3))`
pub fn bucket(hits: u32) -> usize {
    (hits as usize * 3).min(SHADES.len() - 1)
}

/// An empty live heatmap is drawn as the zero grid rather than as no rows
fn grid_from(snapshot: MetricsSnapshot) -> Heatmap {
    if snapshot.heatmap.is_empty() {
        fallback::empty_heatmap()
    } else {
        snapshot.heatmap
    }
}

/// Weekday × hour hit counts
pub struct HeatmapView {
    source: Arc<dyn DataSource>,
    state: Shared<Heatmap>,
}

impl HeatmapView {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            state: Shared::new(Vec::new()),
        }
    }

    pub async fn refresh(&self) {
        let fetched = self.source.get_metrics().await;
        self.state.apply(fetched.map(grid_from));
    }

    pub fn state(&self) -> ViewState<Heatmap> {
        self.state.get()
    }
}

impl Panel for HeatmapView {
    fn title(&self) -> &'static str {
        "Activity Heatmap"
    }

    fn start(&self, period: Duration) -> PollHandle {
        let source = Arc::clone(&self.source);
        let state = self.state.clone();

        spawn_poll(
            "heatmap",
            period,
            move || {
                let source = Arc::clone(&source);
                async move { source.get_metrics().await.map(grid_from) }
            },
            move |fetched| state.apply(fetched),
        )
    }

    fn render(&self) -> String {
        let state = self.state.get();
        let mut out = header(self.title(), &state);
        out.push('\n');

        for (day, row) in state.data.iter().enumerate() {
            let label = u8::try_from(day)
                .ok()
                .and_then(|d| Weekday::try_from(d).ok())
                .map(|w| w.to_string())
                .unwrap_or_else(|| day.to_string());
            let cells: String = row.iter().map(|&hits| SHADES[bucket(hits)]).collect();
            out.push_str(&format!("{:<4}|{}|\n", label, cells));
        }

        out
    }
}
