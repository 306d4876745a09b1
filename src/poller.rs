//! Cancellable periodic polling tasks

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, info};

/// Handle to a running poll; cancels the poll when dropped
#[derive(Debug)]
pub struct PollHandle {
    name: String,
    cancel_tx: watch::Sender<bool>,
    applied: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop the timer. A fetch already in flight still completes, but its
    /// result is discarded.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Number of fetch results applied so far
    pub fn applied(&self) -> u64 {
        self.applied.load(Ordering::SeqCst)
    }

    /// Cancel and wait for the task to finish
    pub async fn shutdown(mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel_tx.send_replace(true);
    }
}

/// Run `fetch` immediately and then once per `period`, handing each result to
/// `apply` unless the poll was cancelled while the fetch was pending.
///
/// Only one fetch is in flight per poll; a slow fetch delays the next tick
/// instead of overlapping it.
pub fn spawn_poll<T, F, Fut, A>(name: impl Into<String>, period: Duration, mut fetch: F, mut apply: A) -> PollHandle
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    A: FnMut(T) + Send + 'static,
{
    let name = name.into();
    let (cancel_tx, mut cancel_rx) = watch::channel(false);
    let applied = Arc::new(AtomicU64::new(0));

    let task_name = name.clone();
    let task_applied = Arc::clone(&applied);

    let task = tokio::spawn(async move {
        info!("Starting poll '{}' every {:?}", task_name, period);

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel_rx.wait_for(|cancelled| *cancelled) => break,
                _ = ticker.tick() => {}
            }

            let value = fetch().await;

            if *cancel_rx.borrow() {
                debug!("Poll '{}' cancelled while fetching, discarding result", task_name);
                break;
            }

            apply(value);
            task_applied.fetch_add(1, Ordering::SeqCst);
        }

        info!("Stopped poll '{}'", task_name);
    });

    PollHandle {
        name,
        cancel_tx,
        applied,
        task: Some(task),
    }
}
