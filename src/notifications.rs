//! Transient user-facing notifications raised by dashboard actions

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Default lifetime of a notification
pub const DEFAULT_TTL: Duration = Duration::from_millis(4000);

const DEFAULT_CAPACITY: usize = 32;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Info => write!(f, "INFO"),
            Level::Success => write!(f, "OK"),
            Level::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Bounded queue of notifications, shared by clones
#[derive(Debug, Clone)]
pub struct Notifications {
    queue: Arc<RwLock<VecDeque<Notification>>>,
    capacity: usize,
    ttl: Duration,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl Notifications {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            queue: Arc::new(RwLock::new(VecDeque::new())),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub async fn push(&self, level: Level, message: impl Into<String>) {
        self.push_at(level, message, Utc::now()).await;
    }

    pub async fn info(&self, message: impl Into<String>) {
        self.push(Level::Info, message).await;
    }

    pub async fn success(&self, message: impl Into<String>) {
        self.push(Level::Success, message).await;
    }

    pub async fn error(&self, message: impl Into<String>) {
        self.push(Level::Error, message).await;
    }

    async fn push_at(&self, level: Level, message: impl Into<String>, created_at: DateTime<Utc>) {
        let mut queue = self.queue.write().await;

        if queue.len() >= self.capacity {
            queue.pop_front();
            warn!("Notification queue full, dropping oldest entry");
        }

        let notification = Notification {
            level,
            message: message.into(),
            created_at,
        };
        debug!("Notification [{}] {}", notification.level, notification.message);
        queue.push_back(notification);
    }

    /// Notifications still visible at `now`, newest first
    pub async fn active_at(&self, now: DateTime<Utc>) -> Vec<Notification> {
        let queue = self.queue.read().await;
        queue
            .iter()
            .rev()
            .filter(|n| !self.expired(n, now))
            .cloned()
            .collect()
    }

    pub async fn active(&self) -> Vec<Notification> {
        self.active_at(Utc::now()).await
    }

    /// Drop expired notifications, returning how many were removed
    pub async fn prune_at(&self, now: DateTime<Utc>) -> usize {
        let mut queue = self.queue.write().await;
        let before = queue.len();
        queue.retain(|n| !self.expired(n, now));
        before - queue.len()
    }

    pub async fn clear(&self) {
        self.queue.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.queue.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.queue.read().await.is_empty()
    }

    fn expired(&self, notification: &Notification, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(notification.created_at);
        match age.to_std() {
            Ok(age) => age >= self.ttl,
            // created in the future relative to `now`
            Err(_) => false,
        }
    }
}
