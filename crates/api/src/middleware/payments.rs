//! Gate for the payment endpoints.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use photoedit_payments::StripeClient;

use crate::error::AppError;
use crate::state::AppState;

/// Yields the Stripe client, or rejects with 503 when payments are not
/// configured.
///
/// List it before [`AuthUser`](crate::middleware::auth::AuthUser) so an
/// unconfigured server answers 503 regardless of credentials.
pub struct RequirePayments(pub Arc<StripeClient>);

impl FromRequestParts<AppState> for RequirePayments {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state.payments.clone().map(RequirePayments).ok_or_else(|| {
            AppError::ServiceUnavailable("Payments are not configured".into())
        })
    }
}
