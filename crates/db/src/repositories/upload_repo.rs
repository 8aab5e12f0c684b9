//! Repository for the `uploads` table.

use sqlx::{PgExecutor, PgPool};
use photoedit_core::types::DbId;

use crate::models::upload::{CreateUpload, Upload};

/// Column list for `uploads` queries.
const COLUMNS: &str = "\
    id, user_id, storage_key, url, media_type, content_type, size_bytes, created_at";

/// Provides CRUD operations for uploads.
pub struct UploadRepo;

impl UploadRepo {
    /// Insert a new upload row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateUpload,
    ) -> Result<Upload, sqlx::Error> {
        let query = format!(
            "INSERT INTO uploads (user_id, storage_key, url, media_type, content_type, size_bytes) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Upload>(&query)
            .bind(&input.user_id)
            .bind(&input.storage_key)
            .bind(&input.url)
            .bind(&input.media_type)
            .bind(&input.content_type)
            .bind(input.size_bytes)
            .fetch_one(executor)
            .await
    }

    /// Find an upload by id regardless of owner.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Upload>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM uploads WHERE id = $1");
        sqlx::query_as::<_, Upload>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an upload by id, only if it belongs to `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: &str,
    ) -> Result<Option<Upload>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM uploads WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Upload>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch several uploads at once (used to assemble task listings).
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Upload>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {COLUMNS} FROM uploads WHERE id = ANY($1)");
        sqlx::query_as::<_, Upload>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// List a user's uploads, newest first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Upload>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM uploads WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Upload>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Delete an upload owned by `user_id`. Returns the deleted row so the
    /// caller can remove the stored object.
    ///
    /// Tasks using it as their original image cascade; results that saved
    /// into it have `saved_image_id` reset to NULL.
    pub async fn delete_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: &str,
    ) -> Result<Option<Upload>, sqlx::Error> {
        let query = format!("DELETE FROM uploads WHERE id = $1 AND user_id = $2 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Upload>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
