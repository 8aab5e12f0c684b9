pub mod health;
pub mod payments;
pub mod results;
pub mod tasks;
pub mod uploads;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /tasks                                 create (POST), list (GET)
/// /tasks/{id}                            status (GET), delete (DELETE)
///
/// /results/{id}/save                     save result to owned storage (POST)
///
/// /uploads                               upload (POST, multipart), list (GET)
/// /uploads/{id}                          delete (DELETE)
///
/// /payments/intents                      create payment intent (POST)
/// /payments/checkout-sessions            create checkout session (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/tasks", tasks::router())
        .nest("/results", results::router())
        .nest("/uploads", uploads::router())
        .nest("/payments", payments::router())
}
