//! Handlers for Stripe payments.
//!
//! Every endpoint answers 503 when Stripe is not configured, before looking
//! at credentials or the body.

use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use photoedit_core::payments::{
    validate_checkout_session, validate_payment_intent, CreateCheckoutSession,
    CreatePaymentIntent, DEFAULT_CURRENCY, DEFAULT_PRODUCT_NAME,
};
use photoedit_payments::{CheckoutSessionParams, PaymentIntentParams};

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::payments::RequirePayments;
use crate::response::DataResponse;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsConfigResponse {
    pub publishable_key: String,
}

/// GET /api/v1/payments/config
///
/// The publishable key the browser initialises Stripe.js with. Public, so no
/// token is required.
pub async fn get_payments_config(
    RequirePayments(stripe): RequirePayments,
) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse::new(PaymentsConfigResponse {
        publishable_key: stripe.publishable_key().to_string(),
    })))
}

/// POST /api/v1/payments/intents
///
/// Create a payment intent for `amount` (major units). Returns the client
/// secret the browser confirms the payment with.
pub async fn create_payment_intent(
    RequirePayments(stripe): RequirePayments,
    auth: AuthUser,
    ApiJson(input): ApiJson<CreatePaymentIntent>,
) -> AppResult<impl IntoResponse> {
    let amount_cents = validate_payment_intent(&input)?;
    let currency = input
        .currency
        .as_deref()
        .unwrap_or(DEFAULT_CURRENCY)
        .to_ascii_lowercase();

    let intent = stripe
        .create_payment_intent(&PaymentIntentParams {
            amount_cents,
            currency: &currency,
            product_id: input.product_id.as_deref(),
            user_id: &auth.user_id,
        })
        .await?;

    let client_secret = intent.client_secret.ok_or_else(|| {
        AppError::Upstream(format!("Payment intent {} has no client secret", intent.id))
    })?;

    Ok(Json(DataResponse::new(PaymentIntentResponse {
        client_secret,
        payment_intent_id: intent.id,
    })))
}

/// POST /api/v1/payments/checkout-sessions
///
/// Create a hosted checkout session for a single line item.
pub async fn create_checkout_session(
    RequirePayments(stripe): RequirePayments,
    auth: AuthUser,
    ApiJson(input): ApiJson<CreateCheckoutSession>,
) -> AppResult<impl IntoResponse> {
    let amount_cents = validate_checkout_session(&input)?;
    let product_name = input
        .product_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(DEFAULT_PRODUCT_NAME);

    let session = stripe
        .create_checkout_session(&CheckoutSessionParams {
            amount_cents,
            currency: DEFAULT_CURRENCY,
            product_name,
            success_url: &input.success_url,
            cancel_url: &input.cancel_url,
            user_id: &auth.user_id,
        })
        .await?;

    Ok(Json(DataResponse::new(CheckoutSessionResponse {
        session_id: session.id,
        url: session.url,
    })))
}
