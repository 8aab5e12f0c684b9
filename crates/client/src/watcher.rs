//! Fixed-interval polling of a single task.
//!
//! The watcher issues one status request per tick and never has two in
//! flight. There is no backoff and no attempt cap; drop the future to stop
//! watching.

use std::time::Duration;

use photoedit_core::types::DbId;
use tokio::time::MissedTickBehavior;

use crate::api::{ApiClient, ApiClientError};
use crate::models::TaskStatus;

/// Delay between two status requests.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

pub struct TaskWatcher<'a> {
    client: &'a ApiClient,
    interval: Duration,
}

impl<'a> TaskWatcher<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self::with_interval(client, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(client: &'a ApiClient, interval: Duration) -> Self {
        Self { client, interval }
    }

    /// Poll until the task is `succeeded` or `failed` and return that status.
    ///
    /// The first request goes out after one interval. A failed request ends
    /// the watch with its error.
    pub async fn watch(&self, task_id: DbId) -> Result<TaskStatus, ApiClientError> {
        self.watch_with(task_id, |_| {}).await
    }

    /// Like [`watch`](Self::watch), calling `on_update` with every status
    /// received, the terminal one included.
    pub async fn watch_with<F>(&self, task_id: DbId, mut on_update: F) -> Result<TaskStatus, ApiClientError>
    where
        F: FnMut(&TaskStatus),
    {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + self.interval, self.interval);
        // A slow request pushes the schedule back instead of bunching polls.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut polls = 0u32;
        loop {
            ticker.tick().await;
            polls += 1;

            let status = match self.client.task_status(task_id).await {
                Ok(status) => status,
                Err(e) => {
                    tracing::warn!(%task_id, polls, error = %e, "Task status poll failed");
                    return Err(e);
                }
            };
            on_update(&status);

            if status.status.is_terminal() {
                tracing::debug!(%task_id, polls, status = ?status.status, "Task reached terminal status");
                return Ok(status);
            }
        }
    }
}
