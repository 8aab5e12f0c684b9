//! Request extractors that gate handlers.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`payments::RequirePayments`] -- Requires Stripe to be configured.

pub mod auth;
pub mod payments;
