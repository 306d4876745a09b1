use super::{Shared, ViewState, header};
use crate::api::DataSource;
use crate::models::BlacklistEntry;
use crate::notifications::Notifications;
use std::sync::Arc;
use tracing::info;

/// Editor for the proxy's domain blacklist; loads on demand rather than polling
pub struct BlacklistManager {
    source: Arc<dyn DataSource>,
    notifications: Notifications,
    state: Shared<Vec<BlacklistEntry>>,
}

impl BlacklistManager {
    pub fn new(source: Arc<dyn DataSource>, notifications: Notifications) -> Self {
        Self {
            source,
            notifications,
            state: Shared::new(Vec::new()),
        }
    }

    pub async fn refresh(&self) {
        let fetched = self.source.get_blacklist().await;
        self.state.apply(fetched);
    }

    /// Submit a domain; blank input only raises a reminder
    pub async fn add(&self, domain: &str) -> bool {
        let domain = domain.trim();
        if domain.is_empty() {
            self.notifications.info("Enter domain").await;
            return false;
        }

        let ok = self.source.add_blacklist(domain).await;
        if ok {
            info!("Blacklisted {}", domain);
            self.notifications.success("Added to blacklist").await;
            self.refresh().await;
        } else {
            self.notifications.error("Failed (api)").await;
        }
        ok
    }

    pub async fn remove(&self, domain: &str) -> bool {
        let ok = self.source.remove_blacklist(domain).await;
        if ok {
            info!("Removed {} from blacklist", domain);
            self.notifications.success("Removed").await;
        } else {
            self.notifications.error("Failed to remove").await;
        }
        self.refresh().await;
        ok
    }

    pub fn state(&self) -> ViewState<Vec<BlacklistEntry>> {
        self.state.get()
    }

    pub fn render(&self) -> String {
        let state = self.state.get();
        let mut out = header("Blacklist Manager", &state);
        out.push('\n');
        for domain in &state.data {
            out.push_str("  ");
            out.push_str(domain);
            out.push('\n');
        }
        out
    }
}
