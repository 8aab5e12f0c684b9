//! Repository for the `image_edit_results` table.

use sqlx::{PgConnection, PgPool};
use photoedit_core::types::DbId;

use crate::models::image_edit::ImageEditResult;

/// Column list for `image_edit_results` queries.
const COLUMNS: &str = "id, task_id, result_image_url, saved_image_id, created_at";

/// Provides operations for the output images of succeeded tasks.
pub struct ImageEditResultRepo;

impl ImageEditResultRepo {
    /// Insert one result per URL, skipping URLs already recorded for the task.
    ///
    /// Relies on `uq_image_edit_results_task_url`, so two polls observing the
    /// same success never duplicate rows. Returns the number of rows inserted.
    pub async fn insert_many(
        conn: &mut PgConnection,
        task_id: DbId,
        urls: &[String],
    ) -> Result<u64, sqlx::Error> {
        if urls.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "INSERT INTO image_edit_results (task_id, result_image_url) \
             SELECT $1, url FROM UNNEST($2::TEXT[]) WITH ORDINALITY AS t(url, ord) \
             ORDER BY ord \
             ON CONFLICT ON CONSTRAINT uq_image_edit_results_task_url DO NOTHING",
        )
        .bind(task_id)
        .bind(urls)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// List results of one task, oldest first.
    pub async fn list_by_task(pool: &PgPool, task_id: DbId) -> Result<Vec<ImageEditResult>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM image_edit_results WHERE task_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ImageEditResult>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// List results for several tasks at once (used to assemble task listings).
    pub async fn list_by_tasks(
        pool: &PgPool,
        task_ids: &[DbId],
    ) -> Result<Vec<ImageEditResult>, sqlx::Error> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM image_edit_results WHERE task_id = ANY($1) \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ImageEditResult>(&query)
            .bind(task_ids)
            .fetch_all(pool)
            .await
    }

    /// Find a result whose parent task belongs to `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: &str,
    ) -> Result<Option<ImageEditResult>, sqlx::Error> {
        sqlx::query_as::<_, ImageEditResult>(
            "SELECT r.id, r.task_id, r.result_image_url, r.saved_image_id, r.created_at \
             FROM image_edit_results r \
             JOIN image_edit_tasks t ON t.id = r.task_id \
             WHERE r.id = $1 AND t.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Attach a saved upload to a result that has none yet.
    ///
    /// Returns `false` if the result already had a saved image.
    pub async fn attach_saved_image(
        conn: &mut PgConnection,
        id: DbId,
        upload_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE image_edit_results SET saved_image_id = $2 \
             WHERE id = $1 AND saved_image_id IS NULL",
        )
        .bind(id)
        .bind(upload_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
