//! Route definitions for image-edit tasks.

use axum::routing::get;
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// Task routes mounted at `/tasks`.
///
/// ```text
/// POST   /                  -> create_task
/// GET    /                  -> list_tasks
/// GET    /{id}              -> get_task
/// DELETE /{id}              -> delete_task
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list_tasks).post(tasks::create_task))
        .route("/{id}", get(tasks::get_task).delete(tasks::delete_task))
}
