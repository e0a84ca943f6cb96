//! Background refresh of a [`HistoryView`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::history::HistoryView;

/// Refreshes a view on every tick and on every store write, until stopped.
#[derive(Debug)]
pub struct RefreshPoller {
    shutdown: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl RefreshPoller {
    /// Spawn the refresh task on the current tokio runtime.
    #[must_use]
    pub fn start(view: Arc<HistoryView>, interval: Duration) -> Self {
        let shutdown = Arc::new(Notify::new());
        let stop = Arc::clone(&shutdown);
        let mut changes = view.subscribe();

        let handle = tokio::spawn(async move {
            info!(?interval, "history refresh poller started");
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut feed_open = true;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        view.refresh();
                    }
                    change = changes.recv(), if feed_open => match change {
                        Ok(change) => {
                            debug!(key = %change.key, op = ?change.op, "store changed");
                            view.refresh();
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "change feed lagged");
                            view.refresh();
                        }
                        Err(RecvError::Closed) => {
                            warn!("change feed closed, polling only");
                            feed_open = false;
                        }
                    },
                    () = stop.notified() => {
                        info!("history refresh poller stopping");
                        break;
                    }
                }
            }
        });

        Self { shutdown, handle }
    }

    /// Stop the task and wait for it to finish.
    pub async fn stop(self) {
        self.shutdown.notify_one();
        if let Err(err) = self.handle.await {
            warn!(error = %err, "history refresh poller ended abnormally");
        }
    }

    /// Whether the background task is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}
