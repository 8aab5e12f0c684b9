//! Shared response envelope for API handlers.
//!
//! Every successful response is `{ "success": true, "data": ... }`. Use
//! [`DataResponse::new`] instead of ad-hoc `serde_json::json!` bodies.

use serde::Serialize;

/// Standard `{ "success": true, "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse::new(items)))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Payload returned by delete endpoints.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: photoedit_core::types::DbId,
    pub deleted: bool,
}

impl Deleted {
    pub fn new(id: photoedit_core::types::DbId) -> Self {
        Self { id, deleted: true }
    }
}
