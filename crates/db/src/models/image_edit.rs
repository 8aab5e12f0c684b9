//! Image edit entity models and DTOs.
//!
//! Covers two related tables:
//! - `image_edit_tasks` -- one remote edit job per row
//! - `image_edit_results` -- output images of succeeded tasks

use serde::Serialize;
use sqlx::FromRow;
use photoedit_core::types::{DbId, Timestamp, UserId};

use crate::models::status::{serialize_task_status, StatusId};

// ---------------------------------------------------------------------------
// ImageEditTask
// ---------------------------------------------------------------------------

/// A row from the `image_edit_tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEditTask {
    pub id: DbId,
    pub user_id: UserId,
    pub original_image_id: DbId,
    pub edit_function: String,
    pub prompt: String,
    pub mask_image_url: Option<String>,
    pub strength: Option<f32>,
    pub image_count: i32,
    #[serde(rename = "status", serialize_with = "serialize_task_status")]
    pub status_id: StatusId,
    pub remote_task_id: String,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// DTO for inserting a new task. Status always starts at `pending`.
#[derive(Debug, Clone)]
pub struct CreateImageEditTaskRow {
    pub user_id: UserId,
    pub original_image_id: DbId,
    pub edit_function: String,
    pub prompt: String,
    pub mask_image_url: Option<String>,
    pub strength: Option<f32>,
    pub image_count: i32,
    pub remote_task_id: String,
}

// ---------------------------------------------------------------------------
// ImageEditResult
// ---------------------------------------------------------------------------

/// A row from the `image_edit_results` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEditResult {
    pub id: DbId,
    pub task_id: DbId,
    pub result_image_url: String,
    pub saved_image_id: Option<DbId>,
    pub created_at: Timestamp,
}
