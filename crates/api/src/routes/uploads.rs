//! Route definitions for direct uploads.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get};
use axum::Router;
use photoedit_core::uploads::MAX_VIDEO_BYTES;

use crate::handlers::uploads;
use crate::state::AppState;

/// Room for multipart framing around the largest accepted file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Upload routes mounted at `/uploads`.
///
/// ```text
/// POST   /                  -> upload_file (multipart)
/// GET    /                  -> list_uploads
/// DELETE /{id}              -> delete_upload
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(uploads::list_uploads)
                .post(uploads::upload_file)
                .layer(DefaultBodyLimit::max(MAX_VIDEO_BYTES + MULTIPART_OVERHEAD_BYTES)),
        )
        .route("/{id}", delete(uploads::delete_upload))
}
