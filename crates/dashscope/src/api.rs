//! REST client for the DashScope image-edit endpoints.
//!
//! Jobs are created in asynchronous mode (`X-DashScope-Async: enable`) and
//! queried by task id. No call is retried here; each poll is a fresh request
//! issued on behalf of a client.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::backend::{CreateJob, DashScopeError, ImageEditBackend, RemoteJob, RemoteJobStatus};
use crate::messages::{SynthesisInput, SynthesisParameters, SynthesisRequest, TaskEnvelope};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/api/v1";

/// Default image-edit model.
pub const DEFAULT_MODEL: &str = "wanx2.1-imageedit";

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Path of the asynchronous image-edit endpoint, relative to the base URL.
const SYNTHESIS_PATH: &str = "services/aigc/image2image/image-synthesis";

/// Connection settings for DashScope.
#[derive(Debug, Clone)]
pub struct DashScopeConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl DashScopeConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default                                  |
    /// |--------------------------|----------|------------------------------------------|
    /// | `DASHSCOPE_API_KEY`      | **yes**  | --                                       |
    /// | `DASHSCOPE_BASE_URL`     | no       | `https://dashscope.aliyuncs.com/api/v1`  |
    /// | `DASHSCOPE_MODEL`        | no       | `wanx2.1-imageedit`                      |
    /// | `DASHSCOPE_TIMEOUT_SECS` | no       | `30`                                     |
    ///
    /// # Panics
    ///
    /// Panics if `DASHSCOPE_API_KEY` is not set or is empty.
    pub fn from_env() -> Self {
        let api_key = std::env::var("DASHSCOPE_API_KEY")
            .expect("DASHSCOPE_API_KEY must be set in the environment");
        assert!(!api_key.is_empty(), "DASHSCOPE_API_KEY must not be empty");

        let base_url = std::env::var("DASHSCOPE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = std::env::var("DASHSCOPE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let timeout_secs: u64 = std::env::var("DASHSCOPE_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("DASHSCOPE_TIMEOUT_SECS must be a valid u64");

        Self {
            api_key,
            base_url,
            model,
            timeout_secs,
        }
    }
}

/// HTTP client for DashScope.
pub struct DashScopeClient {
    client: reqwest::Client,
    config: DashScopeConfig,
}

impl DashScopeClient {
    /// Build a client with its own connection pool and request timeout.
    pub fn new(config: DashScopeConfig) -> Result<Self, DashScopeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: DashScopeConfig) -> Self {
        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    // ---- private helpers ----

    /// Return the response unchanged on 2xx, or an [`DashScopeError::Api`]
    /// carrying the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, DashScopeError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(DashScopeError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, DashScopeError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ImageEditBackend for DashScopeClient {
    async fn create_job(&self, job: &CreateJob) -> Result<String, DashScopeError> {
        let body = SynthesisRequest {
            model: &self.config.model,
            input: SynthesisInput {
                function: job.function.as_str(),
                prompt: &job.prompt,
                base_image_url: &job.base_image_url,
                mask_image_url: job.mask_image_url.as_deref(),
            },
            parameters: SynthesisParameters {
                n: job.count,
                strength: job.strength,
            },
        };

        let response = self
            .client
            .post(self.url(SYNTHESIS_PATH))
            .bearer_auth(&self.config.api_key)
            .header("X-DashScope-Async", "enable")
            .json(&body)
            .send()
            .await?;

        let envelope: TaskEnvelope = Self::parse_response(response).await?;
        if envelope.output.task_id.is_empty() {
            return Err(DashScopeError::Protocol("create response has an empty task_id".into()));
        }

        tracing::info!(
            remote_task_id = %envelope.output.task_id,
            function = %job.function,
            request_id = envelope.request_id.as_deref().unwrap_or("-"),
            "DashScope edit job created",
        );

        Ok(envelope.output.task_id)
    }

    async fn query_job(&self, remote_task_id: &str) -> Result<RemoteJob, DashScopeError> {
        let response = self
            .client
            .get(self.url(&format!("tasks/{remote_task_id}")))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let envelope: TaskEnvelope = Self::parse_response(response).await?;
        let output = envelope.output;
        let status = RemoteJobStatus::parse(&output.task_status);

        for failed in output.results.iter().filter(|r| r.url.is_none()) {
            tracing::warn!(
                remote_task_id,
                code = failed.code.as_deref().unwrap_or("-"),
                message = failed.message.as_deref().unwrap_or("-"),
                "DashScope sub-result without an image",
            );
        }

        let result_urls = output.results.into_iter().filter_map(|r| r.url).collect();
        let error_message = output.message.or(output.code);

        Ok(RemoteJob {
            remote_task_id: output.task_id,
            status,
            result_urls,
            error_message,
        })
    }

    async fn download_result(&self, url: &str) -> Result<Vec<u8>, DashScopeError> {
        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
