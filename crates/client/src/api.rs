//! REST client for the photo-edit API.
//!
//! Every successful response is unwrapped from its `{ success, data }`
//! envelope; every error response is turned into [`ApiClientError::Api`] with
//! the server's `code` and message.

use std::time::Duration;

use photoedit_core::types::DbId;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::models::{CreateTaskRequest, CreatedTask, TaskStatus, TaskSummary, Upload};

/// Per-request timeout used by [`ApiClient::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("API error ({status} {code}): {message}")]
    Api {
        status: u16,
        /// Machine-readable code from the error body, e.g. `NOT_FOUND`.
        code: String,
        message: String,
    },
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

/// Acknowledgement returned by the delete endpoints.
#[derive(Debug, Deserialize)]
pub struct Deleted {
    pub id: DbId,
    pub deleted: bool,
}

/// HTTP client bound to one API base URL and one caller's bearer token.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// * `base_url` - Server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ApiClientError> {
        let client = reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self::with_client(client, base_url, token))
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    // ---- Tasks ----

    pub async fn create_task(&self, request: &CreateTaskRequest) -> Result<CreatedTask, ApiClientError> {
        let response = self
            .client
            .post(self.url("tasks"))
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    /// `GET /tasks/{id}`; the server reconciles non-terminal tasks with the
    /// remote service before answering.
    pub async fn task_status(&self, task_id: DbId) -> Result<TaskStatus, ApiClientError> {
        let response = self
            .client
            .get(self.url(&format!("tasks/{task_id}")))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    pub async fn list_tasks(&self, limit: i64, offset: i64) -> Result<Vec<TaskSummary>, ApiClientError> {
        let response = self
            .client
            .get(self.url("tasks"))
            .bearer_auth(&self.token)
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await?;
        Self::parse_data(response).await
    }

    pub async fn delete_task(&self, task_id: DbId) -> Result<Deleted, ApiClientError> {
        let response = self
            .client
            .delete(self.url(&format!("tasks/{task_id}")))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    // ---- Results ----

    /// Copy a result into the caller's storage. Repeat calls return the same
    /// upload.
    pub async fn save_result(&self, result_id: DbId) -> Result<Upload, ApiClientError> {
        let response = self
            .client
            .post(self.url(&format!("results/{result_id}/save")))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    // ---- Uploads ----

    /// Upload one file as the multipart `file` field.
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Upload, ApiClientError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("uploads"))
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    pub async fn list_uploads(&self, limit: i64, offset: i64) -> Result<Vec<Upload>, ApiClientError> {
        let response = self
            .client
            .get(self.url("uploads"))
            .bearer_auth(&self.token)
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await?;
        Self::parse_data(response).await
    }

    pub async fn delete_upload(&self, upload_id: DbId) -> Result<Deleted, ApiClientError> {
        let response = self
            .client
            .delete(self.url(&format!("uploads/{upload_id}")))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{path}", self.base_url)
    }

    /// Map a non-2xx response to [`ApiClientError::Api`], falling back to
    /// the raw body when it is not the standard error shape.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let (code, message) = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(err) => (err.code, err.error),
            Err(_) => (String::new(), body),
        };
        Err(ApiClientError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    async fn parse_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<Envelope<T>>().await?.data)
    }
}
