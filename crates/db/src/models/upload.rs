//! Upload entity model and insert DTO.

use serde::Serialize;
use sqlx::FromRow;
use photoedit_core::types::{DbId, Timestamp, UserId};

/// A row from the `uploads` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Upload {
    pub id: DbId,
    pub user_id: UserId,
    #[serde(rename = "key")]
    pub storage_key: String,
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: Timestamp,
}

impl Upload {
    /// Whether this upload holds a still image.
    pub fn is_image(&self) -> bool {
        self.media_type == photoedit_core::uploads::MediaType::Image.as_str()
    }
}

/// DTO for inserting a new upload row.
#[derive(Debug, Clone)]
pub struct CreateUpload {
    pub user_id: UserId,
    pub storage_key: String,
    pub url: String,
    pub media_type: String,
    pub content_type: String,
    pub size_bytes: i64,
}
