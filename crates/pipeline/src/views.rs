//! Response shapes returned by the task service.

use serde::Serialize;

use photoedit_core::types::DbId;
use photoedit_db::models::image_edit::{ImageEditResult, ImageEditTask};
use photoedit_db::models::status::TaskStatus;
use photoedit_db::models::upload::Upload;

/// Returned by task creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTask {
    pub task_id: DbId,
    pub status: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    pub id: DbId,
    pub result_image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_image_id: Option<DbId>,
}

impl From<ImageEditResult> for ResultView {
    fn from(r: ImageEditResult) -> Self {
        Self {
            id: r.id,
            result_image_url: r.result_image_url,
            saved_image_id: r.saved_image_id,
        }
    }
}

/// Returned by a status poll.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusView {
    pub task_id: DbId,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<ResultView>,
}

/// One entry of a task listing: the task plus its original image and results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListItem {
    #[serde(flatten)]
    pub task: ImageEditTask,
    pub original_image: Option<Upload>,
    pub results: Vec<ImageEditResult>,
}
