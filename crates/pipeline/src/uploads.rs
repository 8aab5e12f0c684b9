//! Direct uploads into owned storage.

use std::sync::Arc;

use sqlx::PgPool;

use photoedit_core::error::CoreError;
use photoedit_core::types::DbId;
use photoedit_core::uploads::{object_key, validate_upload};
use photoedit_db::models::upload::{CreateUpload, Upload};
use photoedit_db::repositories::{clamp_limit, clamp_offset, UploadRepo};
use photoedit_storage::ObjectStore;

use crate::error::PipelineResult;
use crate::service::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

pub struct UploadService {
    pool: PgPool,
    storage: Arc<dyn ObjectStore>,
    key_prefix: String,
}

impl UploadService {
    pub fn new(pool: PgPool, storage: Arc<dyn ObjectStore>, key_prefix: impl Into<String>) -> Self {
        Self {
            pool,
            storage,
            key_prefix: key_prefix.into(),
        }
    }

    /// Validate, store, and record one file.
    ///
    /// If the row cannot be written the stored object is removed again.
    pub async fn upload(
        &self,
        user_id: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> PipelineResult<Upload> {
        let accepted = validate_upload(content_type, bytes.len())?;
        let key = object_key(&self.key_prefix, None, accepted.extension);

        let stored = self.storage.put_object(&key, bytes, content_type).await?;

        let created = UploadRepo::create(
            &self.pool,
            &CreateUpload {
                user_id: user_id.to_string(),
                storage_key: stored.key.clone(),
                url: stored.url.clone(),
                media_type: accepted.media_type.as_str().to_string(),
                content_type: content_type.to_string(),
                size_bytes: stored.size,
            },
        )
        .await;

        match created {
            Ok(upload) => {
                tracing::info!(
                    upload_id = %upload.id,
                    user_id,
                    key = %upload.storage_key,
                    size_bytes = upload.size_bytes,
                    "File uploaded",
                );
                Ok(upload)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete_object(&stored.key).await {
                    tracing::warn!(key = %stored.key, error = %cleanup, "Failed to remove orphaned object");
                }
                Err(e.into())
            }
        }
    }

    /// The caller's uploads, newest first.
    pub async fn list(
        &self,
        user_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> PipelineResult<Vec<Upload>> {
        let limit = clamp_limit(limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
        let offset = clamp_offset(offset);
        Ok(UploadRepo::list_by_user(&self.pool, user_id, limit, offset).await?)
    }

    /// Delete one of the caller's uploads and its stored object.
    ///
    /// Tasks that used it as their original image are deleted with it.
    pub async fn delete(&self, user_id: &str, upload_id: DbId) -> PipelineResult<()> {
        let upload = UploadRepo::delete_for_user(&self.pool, upload_id, user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Upload",
                id: upload_id,
            })?;

        // The row is gone either way; a stale object is only logged.
        if let Err(e) = self.storage.delete_object(&upload.storage_key).await {
            tracing::warn!(key = %upload.storage_key, error = %e, "Failed to delete stored object");
        }

        tracing::info!(upload_id = %upload_id, user_id, "Upload deleted");
        Ok(())
    }
}
