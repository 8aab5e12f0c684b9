//! Provider-neutral contract for creating and querying remote edit jobs.

use async_trait::async_trait;
use photoedit_core::image_edit::EditFunction;

/// Parameters for a new remote edit job.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateJob {
    pub base_image_url: String,
    pub function: EditFunction,
    pub prompt: String,
    pub mask_image_url: Option<String>,
    pub strength: Option<f32>,
    pub count: i32,
}

/// Status reported by the remote service.
///
/// The four known values map 1:1 onto the local task status. Anything else is
/// kept verbatim in `Unknown` so a protocol change surfaces instead of being
/// mistaken for `Pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteJobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown(String),
}

impl RemoteJobStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "PENDING" => RemoteJobStatus::Pending,
            "RUNNING" => RemoteJobStatus::Running,
            "SUCCEEDED" => RemoteJobStatus::Succeeded,
            "FAILED" => RemoteJobStatus::Failed,
            other => RemoteJobStatus::Unknown(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RemoteJobStatus::Succeeded | RemoteJobStatus::Failed)
    }
}

/// Snapshot of a remote job.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteJob {
    pub remote_task_id: String,
    pub status: RemoteJobStatus,
    /// Output image URLs; only populated once the job succeeded.
    pub result_urls: Vec<String>,
    pub error_message: Option<String>,
}

/// Errors from the remote job client.
#[derive(Debug, thiserror::Error)]
pub enum DashScopeError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// DashScope returned a non-2xx status code.
    #[error("DashScope API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A 2xx response that did not carry what the protocol promises.
    #[error("Malformed DashScope response: {0}")]
    Protocol(String),
}

/// Remote image-edit service.
///
/// Implemented by [`DashScopeClient`](crate::api::DashScopeClient) and by test
/// doubles; the task service only ever sees this trait.
#[async_trait]
pub trait ImageEditBackend: Send + Sync {
    /// Submit a job. Returns the remote task id.
    async fn create_job(&self, job: &CreateJob) -> Result<String, DashScopeError>;

    /// Fetch the current state of a job.
    async fn query_job(&self, remote_task_id: &str) -> Result<RemoteJob, DashScopeError>;

    /// Download an output image produced by a job.
    async fn download_result(&self, url: &str) -> Result<Vec<u8>, DashScopeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_parse() {
        assert_eq!(RemoteJobStatus::parse("PENDING"), RemoteJobStatus::Pending);
        assert_eq!(RemoteJobStatus::parse("RUNNING"), RemoteJobStatus::Running);
        assert_eq!(RemoteJobStatus::parse("SUCCEEDED"), RemoteJobStatus::Succeeded);
        assert_eq!(RemoteJobStatus::parse("FAILED"), RemoteJobStatus::Failed);
    }

    #[test]
    fn unrecognized_status_is_not_pending() {
        let status = RemoteJobStatus::parse("CANCELED");
        assert_eq!(status, RemoteJobStatus::Unknown("CANCELED".into()));
        assert!(!status.is_terminal());
        assert_eq!(
            RemoteJobStatus::parse("pending"),
            RemoteJobStatus::Unknown("pending".into())
        );
    }
}
