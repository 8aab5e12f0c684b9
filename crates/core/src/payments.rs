//! Payment request rules.
//!
//! Amounts arrive in major currency units (dollars) and are sent to the
//! payment gateway in minor units (cents).

use serde::Deserialize;

use crate::error::CoreError;

/// Smallest amount accepted for a checkout session, in major units.
pub const MIN_CHECKOUT_AMOUNT: f64 = 0.5;

/// Currency used when a request does not name one.
pub const DEFAULT_CURRENCY: &str = "usd";

/// Product name shown on checkout when the request omits one.
pub const DEFAULT_PRODUCT_NAME: &str = "Photo Edit Credits";

/// Body of `POST /api/v1/payments/intents`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntent {
    pub amount: f64,
    pub currency: Option<String>,
    pub product_id: Option<String>,
}

/// Body of `POST /api/v1/payments/checkout-sessions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSession {
    pub amount: f64,
    pub product_name: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

/// Convert a major-unit amount to minor units, rounding to the nearest cent.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Validate a payment-intent amount and currency. Returns the amount in cents.
pub fn validate_payment_intent(input: &CreatePaymentIntent) -> Result<i64, CoreError> {
    if !input.amount.is_finite() || input.amount <= 0.0 {
        return Err(CoreError::Validation("amount must be greater than 0".into()));
    }
    if let Some(currency) = &input.currency {
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::Validation(format!(
                "currency '{currency}' must be a three-letter ISO code"
            )));
        }
    }
    let cents = to_minor_units(input.amount);
    if cents < 1 {
        return Err(CoreError::Validation("amount must be at least one cent".into()));
    }
    Ok(cents)
}

/// Validate a checkout-session request. Returns the amount in cents.
pub fn validate_checkout_session(input: &CreateCheckoutSession) -> Result<i64, CoreError> {
    if !input.amount.is_finite() || input.amount < MIN_CHECKOUT_AMOUNT {
        return Err(CoreError::Validation(format!(
            "amount must be at least {MIN_CHECKOUT_AMOUNT:.2}"
        )));
    }
    for (field, value) in [("successUrl", &input.success_url), ("cancelUrl", &input.cancel_url)] {
        if !(value.starts_with("https://") || value.starts_with("http://")) {
            return Err(CoreError::Validation(format!("{field} must be an http(s) URL")));
        }
    }
    Ok(to_minor_units(input.amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(amount: f64) -> CreatePaymentIntent {
        CreatePaymentIntent {
            amount,
            currency: None,
            product_id: None,
        }
    }

    fn checkout(amount: f64) -> CreateCheckoutSession {
        CreateCheckoutSession {
            amount,
            product_name: None,
            success_url: "https://app.example.com/ok".into(),
            cancel_url: "https://app.example.com/cancel".into(),
        }
    }

    #[test]
    fn minor_units_round() {
        assert_eq!(to_minor_units(9.99), 999);
        assert_eq!(to_minor_units(0.5), 50);
        assert_eq!(to_minor_units(19.999), 2000);
    }

    #[test]
    fn intent_requires_positive_amount() {
        assert_eq!(validate_payment_intent(&intent(12.5)).unwrap(), 1250);
        assert!(validate_payment_intent(&intent(0.0)).is_err());
        assert!(validate_payment_intent(&intent(-3.0)).is_err());
        assert!(validate_payment_intent(&intent(f64::NAN)).is_err());
    }

    #[test]
    fn intent_rejects_bad_currency() {
        let mut req = intent(5.0);
        req.currency = Some("dollars".into());
        assert!(validate_payment_intent(&req).is_err());
        req.currency = Some("eur".into());
        assert!(validate_payment_intent(&req).is_ok());
    }

    #[test]
    fn checkout_enforces_minimum() {
        assert_eq!(validate_checkout_session(&checkout(0.5)).unwrap(), 50);
        assert!(validate_checkout_session(&checkout(0.49)).is_err());
    }

    #[test]
    fn checkout_requires_http_urls() {
        let mut req = checkout(10.0);
        req.cancel_url = "javascript:alert(1)".into();
        assert!(validate_checkout_session(&req).is_err());
    }
}
