use axum::routing::post;
use axum::Router;

use crate::handlers::results;
use crate::state::AppState;

/// Result routes mounted at `/results`.
///
/// ```text
/// POST   /{id}/save         -> save_result
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/save", post(results::save_result))
}
