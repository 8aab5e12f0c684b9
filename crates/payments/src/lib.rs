//! Minimal Stripe REST client: payment intents and hosted checkout sessions.
//!
//! Payments are optional. [`StripeConfig::from_env`] returns `None` when the
//! keys are absent and the API answers the payment endpoints with 503.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Default Stripe API root.
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub publishable_key: String,
    pub api_base: String,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default                     |
    /// |--------------------------|----------|-----------------------------|
    /// | `STRIPE_SECRET_KEY`      | no       | payments disabled           |
    /// | `STRIPE_PUBLISHABLE_KEY` | no       | payments disabled           |
    /// | `STRIPE_API_BASE`        | no       | `https://api.stripe.com/v1` |
    ///
    /// Both keys must be present and non-empty for payments to be enabled.
    pub fn from_env() -> Option<Self> {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let secret_key = non_empty("STRIPE_SECRET_KEY")?;
        let publishable_key = non_empty("STRIPE_PUBLISHABLE_KEY")?;
        let api_base = non_empty("STRIPE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.into());

        Some(Self {
            secret_key,
            publishable_key,
            api_base,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Stripe API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Input for a payment intent. Amounts are in minor units.
#[derive(Debug, Clone)]
pub struct PaymentIntentParams<'a> {
    pub amount_cents: i64,
    pub currency: &'a str,
    pub product_id: Option<&'a str>,
    pub user_id: &'a str,
}

/// Input for a one-item hosted checkout session. Amounts are in minor units.
#[derive(Debug, Clone)]
pub struct CheckoutSessionParams<'a> {
    pub amount_cents: i64,
    pub currency: &'a str,
    pub product_name: &'a str,
    pub success_url: &'a str,
    pub cancel_url: &'a str,
    pub user_id: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct StripeClient {
    client: reqwest::Client,
    config: StripeConfig,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> Result<Self, StripeError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    pub fn publishable_key(&self) -> &str {
        &self.config.publishable_key
    }

    /// `POST /payment_intents` with automatic payment methods enabled.
    pub async fn create_payment_intent(
        &self,
        params: &PaymentIntentParams<'_>,
    ) -> Result<PaymentIntent, StripeError> {
        let form = vec![
            ("amount", params.amount_cents.to_string()),
            ("currency", params.currency.to_string()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
            ("metadata[userId]", params.user_id.to_string()),
            (
                "metadata[productId]",
                params.product_id.unwrap_or_default().to_string(),
            ),
        ];

        let intent: PaymentIntent = self.post_form("payment_intents", &form).await?;
        tracing::info!(
            payment_intent_id = %intent.id,
            user_id = params.user_id,
            amount_cents = params.amount_cents,
            "Payment intent created",
        );
        Ok(intent)
    }

    /// `POST /checkout/sessions` for a single card-paid line item.
    pub async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams<'_>,
    ) -> Result<CheckoutSession, StripeError> {
        let form = vec![
            ("mode", "payment".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("success_url", params.success_url.to_string()),
            ("cancel_url", params.cancel_url.to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", params.currency.to_string()),
            (
                "line_items[0][price_data][unit_amount]",
                params.amount_cents.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                params.product_name.to_string(),
            ),
            ("metadata[userId]", params.user_id.to_string()),
        ];

        let session: CheckoutSession = self.post_form("checkout/sessions", &form).await?;
        tracing::info!(
            session_id = %session.id,
            user_id = params.user_id,
            amount_cents = params.amount_cents,
            "Checkout session created",
        );
        Ok(session)
    }

    // ---- private helpers ----

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T, StripeError> {
        let url = format!("{}/{}", self.config.api_base.trim_end_matches('/'), path);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.secret_key)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or(body);
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Form, Json, Router};

    use super::*;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    fn client(api_base: String) -> StripeClient {
        StripeClient::new(StripeConfig {
            secret_key: "sk_test_123".into(),
            publishable_key: "pk_test_123".into(),
            api_base,
        })
        .unwrap()
    }

    async fn intents(
        headers: HeaderMap,
        Form(form): Form<HashMap<String, String>>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        let auth = headers.get("authorization").and_then(|v| v.to_str().ok());
        if auth != Some("Bearer sk_test_123") {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": { "message": "Invalid API Key" } })),
            );
        }
        if form.get("amount").map(String::as_str) == Some("0") {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": { "message": "Amount must be positive" } })),
            );
        }
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "id": "pi_1",
                "client_secret": format!("pi_1_secret_{}", form["metadata[userId]"]),
            })),
        )
    }

    async fn sessions(Form(form): Form<HashMap<String, String>>) -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "id": "cs_1",
            "url": format!(
                "https://checkout.example.com/{}/{}",
                form["line_items[0][price_data][unit_amount]"],
                form["line_items[0][price_data][product_data][name]"].replace(' ', "-"),
            ),
        }))
    }

    fn stub() -> Router {
        Router::new()
            .route("/v1/payment_intents", post(intents))
            .route("/v1/checkout/sessions", post(sessions))
    }

    #[test]
    fn config_is_none_without_keys() {
        // Only meaningful when the test environment does not configure Stripe.
        if std::env::var("STRIPE_SECRET_KEY").is_err() {
            assert!(StripeConfig::from_env().is_none());
        }
    }

    #[tokio::test]
    async fn payment_intent_carries_user_metadata() {
        let base = serve(stub()).await;
        let intent = client(base)
            .create_payment_intent(&PaymentIntentParams {
                amount_cents: 1999,
                currency: "usd",
                product_id: None,
                user_id: "user-1",
            })
            .await
            .unwrap();
        assert_eq!(intent.id, "pi_1");
        assert_eq!(intent.client_secret.as_deref(), Some("pi_1_secret_user-1"));
    }

    #[tokio::test]
    async fn stripe_error_message_is_extracted() {
        let base = serve(stub()).await;
        let err = client(base)
            .create_payment_intent(&PaymentIntentParams {
                amount_cents: 0,
                currency: "usd",
                product_id: None,
                user_id: "user-1",
            })
            .await
            .unwrap_err();
        assert_matches!(
            err,
            StripeError::Api { status: 400, message } if message == "Amount must be positive"
        );
    }

    #[tokio::test]
    async fn checkout_session_sends_line_item() {
        let base = serve(stub()).await;
        let session = client(base)
            .create_checkout_session(&CheckoutSessionParams {
                amount_cents: 500,
                currency: "usd",
                product_name: "Photo Edit Credits",
                success_url: "https://app.example.com/ok",
                cancel_url: "https://app.example.com/cancel",
                user_id: "user-1",
            })
            .await
            .unwrap();
        assert_eq!(session.id, "cs_1");
        assert_eq!(
            session.url.as_deref(),
            Some("https://checkout.example.com/500/Photo-Edit-Credits")
        );
    }
}
