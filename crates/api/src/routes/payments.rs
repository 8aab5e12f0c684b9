use axum::routing::{get, post};
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Payment routes mounted at `/payments`.
///
/// ```text
/// GET    /config             -> get_payments_config
/// POST   /intents            -> create_payment_intent
/// POST   /checkout-sessions  -> create_checkout_session
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/config", get(payments::get_payments_config))
        .route("/intents", post(payments::create_payment_intent))
        .route("/checkout-sessions", post(payments::create_checkout_session))
}
