//! Handlers for direct uploads.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use photoedit_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiPath, ApiQuery};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{DataResponse, Deleted};
use crate::state::AppState;

/// POST /api/v1/uploads
///
/// Accepts a multipart form with exactly one `file` field. The part's content
/// type decides whether it is stored as an image or a video.
pub async fn upload_file(
    auth: AuthUser,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<impl IntoResponse> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue; // ignore unknown fields
        }
        if file.is_some() {
            return Err(AppError::BadRequest(
                "Only one file may be uploaded per request".into(),
            ));
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        file = Some((content_type, data.to_vec()));
    }

    let (content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("No file provided".into()))?;

    let upload = state
        .uploads
        .upload(&auth.user_id, &content_type, data)
        .await?;

    Ok(Json(DataResponse::new(upload)))
}

/// GET /api/v1/uploads
///
/// The caller's uploads, newest first.
pub async fn list_uploads(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let uploads = state
        .uploads
        .list(&auth.user_id, params.limit, params.offset)
        .await?;

    Ok(Json(DataResponse::new(uploads)))
}

/// DELETE /api/v1/uploads/{id}
///
/// Delete an upload and its stored object. Tasks editing it go with it.
pub async fn delete_upload(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(upload_id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    state.uploads.delete(&auth.user_id, upload_id).await?;

    Ok(Json(DataResponse::new(Deleted::new(upload_id))))
}
