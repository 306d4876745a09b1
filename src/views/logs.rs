use super::{Panel, Shared, ViewState, header};
use crate::api::DataSource;
use crate::models::LogEntry;
use crate::poller::{PollHandle, spawn_poll};
use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;

/// Table of the most recent proxied requests
pub struct LogsView {
    source: Arc<dyn DataSource>,
    limit: usize,
    state: Shared<Vec<LogEntry>>,
}

impl LogsView {
    pub fn new(source: Arc<dyn DataSource>, limit: usize) -> Self {
        Self {
            source,
            limit,
            state: Shared::new(Vec::new()),
        }
    }

    pub async fn refresh(&self) {
        let fetched = self.source.get_logs(self.limit).await;
        self.state.apply(fetched);
    }

    pub fn state(&self) -> ViewState<Vec<LogEntry>> {
        self.state.get()
    }
}

impl Panel for LogsView {
    fn title(&self) -> &'static str {
        "Proxy Logs"
    }

    fn start(&self, period: Duration) -> PollHandle {
        let source = Arc::clone(&self.source);
        let state = self.state.clone();
        let limit = self.limit;

        spawn_poll(
            "logs",
            period,
            move || {
                let source = Arc::clone(&source);
                async move { source.get_logs(limit).await }
            },
            move |fetched| state.apply(fetched),
        )
    }

    fn render(&self) -> String {
        let state = self.state.get();
        let mut out = header(self.title(), &state);
        out.push('\n');

        if state.data.is_empty() {
            out.push_str("No logs\n");
            return out;
        }

        let _ = writeln!(out, "{:<26} {:<18} {}", "Time", "Client", "Host");
        for entry in &state.data {
            let _ = writeln!(
                out,
                "{:<26} {:<18} {}",
                entry.display_time(),
                entry.client_id(),
                entry.display_host()
            );
        }

        out
    }
}
