//! Wire types for the DashScope image-synthesis and task endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /services/aigc/image2image/image-synthesis`.
#[derive(Debug, Serialize)]
pub struct SynthesisRequest<'a> {
    pub model: &'a str,
    pub input: SynthesisInput<'a>,
    pub parameters: SynthesisParameters,
}

#[derive(Debug, Serialize)]
pub struct SynthesisInput<'a> {
    pub function: &'a str,
    pub prompt: &'a str,
    pub base_image_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_image_url: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct SynthesisParameters {
    pub n: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f32>,
}

/// Envelope shared by the create and query responses.
#[derive(Debug, Deserialize)]
pub struct TaskEnvelope {
    pub output: TaskOutput,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TaskOutput {
    pub task_id: String,
    pub task_status: String,
    #[serde(default)]
    pub results: Vec<TaskResult>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One output entry. Failed sub-results carry `code`/`message` and no `url`.
#[derive(Debug, Deserialize)]
pub struct TaskResult {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
