//! Drive a remote job to completion by polling its status.

use std::time::Duration;

use tokio::time::Instant;

use crate::backend::{DashScopeError, ImageEditBackend, RemoteJob, RemoteJobStatus};

/// Fixed delay between two status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Give up after this long without a terminal status.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The job reached `FAILED`.
    #[error("Remote job {remote_task_id} failed: {message}")]
    Failed {
        remote_task_id: String,
        message: String,
    },

    #[error("Remote job {remote_task_id} did not finish within {waited:?}")]
    Timeout {
        remote_task_id: String,
        waited: Duration,
    },

    #[error("Remote job {remote_task_id} reported unrecognized status '{status}'")]
    Unrecognized {
        remote_task_id: String,
        status: String,
    },

    #[error(transparent)]
    Backend(#[from] DashScopeError),
}

/// Query `remote_task_id` every `options.interval` until it succeeds.
///
/// Returns the succeeded job (with its result URLs). A `FAILED` job, an
/// unknown status, or exceeding `options.max_wait` end the loop with an error.
pub async fn wait_for_completion(
    backend: &dyn ImageEditBackend,
    remote_task_id: &str,
    options: PollOptions,
) -> Result<RemoteJob, PollError> {
    let started = Instant::now();

    loop {
        let job = backend.query_job(remote_task_id).await?;

        match &job.status {
            RemoteJobStatus::Succeeded => return Ok(job),
            RemoteJobStatus::Failed => {
                return Err(PollError::Failed {
                    remote_task_id: remote_task_id.to_string(),
                    message: job
                        .error_message
                        .unwrap_or_else(|| "Unknown error".to_string()),
                });
            }
            RemoteJobStatus::Unknown(status) => {
                return Err(PollError::Unrecognized {
                    remote_task_id: remote_task_id.to_string(),
                    status: status.clone(),
                });
            }
            RemoteJobStatus::Pending | RemoteJobStatus::Running => {}
        }

        let waited = started.elapsed();
        if waited + options.interval > options.max_wait {
            return Err(PollError::Timeout {
                remote_task_id: remote_task_id.to_string(),
                waited,
            });
        }

        tracing::debug!(remote_task_id, status = ?job.status, "Remote job still in progress");
        tokio::time::sleep(options.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;
    use crate::backend::CreateJob;

    /// Replays a fixed sequence of statuses, repeating the last one.
    struct Scripted {
        statuses: Mutex<Vec<RemoteJobStatus>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(statuses: Vec<RemoteJobStatus>) -> Self {
            Self {
                statuses: Mutex::new(statuses),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ImageEditBackend for Scripted {
        async fn create_job(&self, _job: &CreateJob) -> Result<String, DashScopeError> {
            Ok("remote-1".into())
        }

        async fn query_job(&self, remote_task_id: &str) -> Result<RemoteJob, DashScopeError> {
            *self.calls.lock().unwrap() += 1;
            let mut statuses = self.statuses.lock().unwrap();
            let status = if statuses.len() > 1 {
                statuses.remove(0)
            } else {
                statuses[0].clone()
            };
            let result_urls = if status == RemoteJobStatus::Succeeded {
                vec!["https://out.example.com/1.png".to_string()]
            } else {
                Vec::new()
            };
            let error_message =
                (status == RemoteJobStatus::Failed).then(|| "NSFW content detected".to_string());
            Ok(RemoteJob {
                remote_task_id: remote_task_id.to_string(),
                status,
                result_urls,
                error_message,
            })
        }

        async fn download_result(&self, _url: &str) -> Result<Vec<u8>, DashScopeError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn returns_results_once_succeeded() {
        let backend = Scripted::new(vec![
            RemoteJobStatus::Pending,
            RemoteJobStatus::Running,
            RemoteJobStatus::Succeeded,
        ]);
        let job = wait_for_completion(&backend, "remote-1", PollOptions::default())
            .await
            .unwrap();
        assert_eq!(job.result_urls.len(), 1);
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_job_carries_message() {
        let backend = Scripted::new(vec![RemoteJobStatus::Running, RemoteJobStatus::Failed]);
        let err = wait_for_completion(&backend, "remote-1", PollOptions::default())
            .await
            .unwrap_err();
        assert_matches!(err, PollError::Failed { message, .. } if message == "NSFW content detected");
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_wait() {
        let backend = Scripted::new(vec![RemoteJobStatus::Running]);
        let options = PollOptions {
            interval: Duration::from_secs(3),
            max_wait: Duration::from_secs(30),
        };
        let err = wait_for_completion(&backend, "remote-1", options)
            .await
            .unwrap_err();
        assert_matches!(err, PollError::Timeout { .. });
        assert!(backend.calls() >= 10);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_status_stops_immediately() {
        let backend = Scripted::new(vec![RemoteJobStatus::Unknown("CANCELED".into())]);
        let err = wait_for_completion(&backend, "remote-1", PollOptions::default())
            .await
            .unwrap_err();
        assert_matches!(err, PollError::Unrecognized { status, .. } if status == "CANCELED");
        assert_eq!(backend.calls(), 1);
    }
}
