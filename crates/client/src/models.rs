//! Wire types of the photo-edit API as seen by a client.

use chrono::{DateTime, Utc};
use photoedit_core::image_edit::EditFunction;
use photoedit_core::types::DbId;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }
}

/// Body of `POST /api/v1/tasks`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub edit_function: EditFunction,
    pub original_image_id: DbId,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_count: Option<i32>,
}

impl CreateTaskRequest {
    /// A request with only the required fields set.
    pub fn new(edit_function: EditFunction, original_image_id: DbId, prompt: impl Into<String>) -> Self {
        Self {
            edit_function,
            original_image_id,
            prompt: prompt.into(),
            mask_image_url: None,
            strength: None,
            image_count: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTask {
    pub task_id: DbId,
    pub status: TaskState,
}

/// One output image of a succeeded task.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub id: DbId,
    pub result_image_url: String,
    #[serde(default)]
    pub saved_image_id: Option<DbId>,
}

/// Response of `GET /api/v1/tasks/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub task_id: DbId,
    pub status: TaskState,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<TaskResult>,
}

/// A stored file owned by the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Upload {
    pub id: DbId,
    pub key: String,
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

/// One entry of `GET /api/v1/tasks`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub id: DbId,
    pub edit_function: EditFunction,
    pub prompt: String,
    pub status: TaskState,
    #[serde(default)]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub original_image: Option<Upload>,
    #[serde(default)]
    pub results: Vec<TaskResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_omits_unset_options() {
        let request = CreateTaskRequest::new(
            EditFunction::Colorization,
            uuid::Uuid::nil(),
            "colorize",
        );
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["editFunction"], "colorization");
        assert_eq!(json["originalImageId"], "00000000-0000-0000-0000-000000000000");
        assert!(json.get("strength").is_none());
        assert!(json.get("maskImageUrl").is_none());
    }

    #[test]
    fn pending_status_has_no_results() {
        let status: TaskStatus = serde_json::from_value(serde_json::json!({
            "taskId": "00000000-0000-0000-0000-000000000001",
            "status": "pending",
        }))
        .unwrap();

        assert_eq!(status.status, TaskState::Pending);
        assert!(!status.status.is_terminal());
        assert!(status.results.is_empty());
    }

    #[test]
    fn failed_status_carries_message() {
        let status: TaskStatus = serde_json::from_value(serde_json::json!({
            "taskId": "00000000-0000-0000-0000-000000000001",
            "status": "failed",
            "errorMessage": "NSFW content detected",
        }))
        .unwrap();

        assert!(status.status.is_terminal());
        assert_eq!(status.error_message.as_deref(), Some("NSFW content detected"));
    }
}
