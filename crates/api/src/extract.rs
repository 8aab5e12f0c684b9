//! Extractors whose rejections use the standard JSON error body.
//!
//! Axum's own `Json`, `Path`, and `Query` reject with plain text and, for
//! JSON, with 415/422. These wrappers turn every rejection into
//! [`AppError::BadRequest`](crate::error::AppError::BadRequest).

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// `Json<T>` that rejects with a 400 JSON error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `Path<T>` that rejects with a 400 JSON error.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// `Query<T>` that rejects with a 400 JSON error.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
