//! Handlers for image-edit tasks.
//!
//! Status reads reconcile with the remote service on demand; there is no
//! background poller. All endpoints require authentication via [`AuthUser`].

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use photoedit_core::image_edit::CreateImageEditTask;
use photoedit_core::types::DbId;

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{DataResponse, Deleted};
use crate::state::AppState;

/// POST /api/v1/tasks
///
/// Submit an edit job for one of the caller's images. Returns
/// `{ taskId, status: "pending" }`.
pub async fn create_task(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateImageEditTask>,
) -> AppResult<impl IntoResponse> {
    let created = state.image_edits.create_task(&auth.user_id, &input).await?;

    Ok(Json(DataResponse::new(created)))
}

/// GET /api/v1/tasks
///
/// The caller's tasks, newest first, with original image and results nested.
pub async fn list_tasks(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let items = state
        .image_edits
        .list_tasks(&auth.user_id, params.limit, params.offset)
        .await?;

    Ok(Json(DataResponse::new(items)))
}

/// GET /api/v1/tasks/{id}
///
/// Current status; asks the remote service only while the task is not terminal.
pub async fn get_task(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(task_id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let view = state
        .image_edits
        .get_task_status(&auth.user_id, task_id)
        .await?;

    Ok(Json(DataResponse::new(view)))
}

/// DELETE /api/v1/tasks/{id}
///
/// Delete a task and its results.
pub async fn delete_task(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(task_id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    state.image_edits.delete_task(&auth.user_id, task_id).await?;

    Ok(Json(DataResponse::new(Deleted::new(task_id))))
}
