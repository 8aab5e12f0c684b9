//! Repository for the `image_edit_tasks` table.
//!
//! Uses `TaskStatus` from `models::status` for all status transitions.

use sqlx::{PgConnection, PgPool};
use photoedit_core::types::DbId;

use crate::models::image_edit::{CreateImageEditTaskRow, ImageEditTask};
use crate::models::status::{TaskStatus, TERMINAL_TASK_STATUSES};

/// Column list for `image_edit_tasks` queries.
const COLUMNS: &str = "\
    id, user_id, original_image_id, edit_function, prompt, mask_image_url, \
    strength, image_count, status_id, remote_task_id, error_message, \
    created_at, updated_at, completed_at";

/// Provides CRUD and status operations for image edit tasks.
pub struct ImageEditTaskRepo;

impl ImageEditTaskRepo {
    /// Insert a new task in `pending` status.
    pub async fn create(
        pool: &PgPool,
        input: &CreateImageEditTaskRow,
    ) -> Result<ImageEditTask, sqlx::Error> {
        let query = format!(
            "INSERT INTO image_edit_tasks \
                 (user_id, original_image_id, edit_function, prompt, mask_image_url, \
                  strength, image_count, status_id, remote_task_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImageEditTask>(&query)
            .bind(&input.user_id)
            .bind(input.original_image_id)
            .bind(&input.edit_function)
            .bind(&input.prompt)
            .bind(&input.mask_image_url)
            .bind(input.strength)
            .bind(input.image_count)
            .bind(TaskStatus::Pending.id())
            .bind(&input.remote_task_id)
            .fetch_one(pool)
            .await
    }

    /// Find a task by id, only if it belongs to `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: &str,
    ) -> Result<Option<ImageEditTask>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM image_edit_tasks WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, ImageEditTask>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a task by id inside an open transaction.
    pub async fn find_by_id_tx(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ImageEditTask>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM image_edit_tasks WHERE id = $1");
        sqlx::query_as::<_, ImageEditTask>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List a user's tasks, newest first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ImageEditTask>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM image_edit_tasks WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ImageEditTask>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Bump `updated_at` after a poll that observed no status change.
    pub async fn touch(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE image_edit_tasks SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Move a non-terminal task to `status`.
    ///
    /// Sets `completed_at` when `status` is terminal and records
    /// `error_message` (only meaningful for `failed`). Returns `false` when
    /// the row was already terminal, which means a concurrent poll got there
    /// first and nothing was written.
    pub async fn advance_status(
        conn: &mut PgConnection,
        id: DbId,
        status: TaskStatus,
        error_message: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE image_edit_tasks \
             SET status_id = $2, \
                 error_message = $3, \
                 updated_at = NOW(), \
                 completed_at = CASE WHEN $4 THEN NOW() ELSE completed_at END \
             WHERE id = $1 AND status_id NOT IN ($5, $6)",
        )
        .bind(id)
        .bind(status.id())
        .bind(error_message)
        .bind(status.is_terminal())
        .bind(TERMINAL_TASK_STATUSES[0])
        .bind(TERMINAL_TASK_STATUSES[1])
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a task owned by `user_id`. Results cascade.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM image_edit_tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
