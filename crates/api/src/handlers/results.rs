//! Handlers for task results.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use photoedit_core::types::DbId;

use crate::error::AppResult;
use crate::extract::ApiPath;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/results/{id}/save
///
/// Copy a result image into the caller's storage. Repeating the call returns
/// the same upload.
pub async fn save_result(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(result_id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let upload = state
        .image_edits
        .save_result_locally(&auth.user_id, result_id)
        .await?;

    Ok(Json(DataResponse::new(upload)))
}
