//! Repository-level tests against a real PostgreSQL database.
//!
//! Each test gets a fresh database with all migrations applied.

use sqlx::PgPool;
use photoedit_db::models::image_edit::CreateImageEditTaskRow;
use photoedit_db::models::status::TaskStatus;
use photoedit_db::models::upload::{CreateUpload, Upload};
use photoedit_db::repositories::{ImageEditResultRepo, ImageEditTaskRepo, UploadRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_upload(pool: &PgPool, user_id: &str, media_type: &str) -> Upload {
    let key = format!("smartphoto/{}.png", uuid::Uuid::new_v4());
    UploadRepo::create(
        pool,
        &CreateUpload {
            user_id: user_id.to_string(),
            url: format!("https://bucket.example.com/{key}"),
            storage_key: key,
            media_type: media_type.to_string(),
            content_type: "image/png".to_string(),
            size_bytes: 2048,
        },
    )
    .await
    .unwrap()
}

fn new_task(user_id: &str, original_image_id: uuid::Uuid) -> CreateImageEditTaskRow {
    CreateImageEditTaskRow {
        user_id: user_id.to_string(),
        original_image_id,
        edit_function: "colorization".to_string(),
        prompt: "add color".to_string(),
        mask_image_url: None,
        strength: Some(0.5),
        image_count: 1,
        remote_task_id: format!("remote-{}", uuid::Uuid::new_v4()),
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn new_task_starts_pending(pool: PgPool) {
    let upload = new_upload(&pool, "user-a", "image").await;
    let task = ImageEditTaskRepo::create(&pool, &new_task("user-a", upload.id))
        .await
        .unwrap();

    assert_eq!(task.status_id, TaskStatus::Pending.id());
    assert!(task.completed_at.is_none());
    assert!(task.error_message.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_for_user_is_scoped_to_owner(pool: PgPool) {
    let upload = new_upload(&pool, "user-a", "image").await;
    let task = ImageEditTaskRepo::create(&pool, &new_task("user-a", upload.id))
        .await
        .unwrap();

    assert!(ImageEditTaskRepo::find_for_user(&pool, task.id, "user-a")
        .await
        .unwrap()
        .is_some());
    assert!(ImageEditTaskRepo::find_for_user(&pool, task.id, "user-b")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn advance_status_refuses_to_leave_terminal(pool: PgPool) {
    let upload = new_upload(&pool, "user-a", "image").await;
    let task = ImageEditTaskRepo::create(&pool, &new_task("user-a", upload.id))
        .await
        .unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let moved = ImageEditTaskRepo::advance_status(&mut conn, task.id, TaskStatus::Failed, Some("boom"))
        .await
        .unwrap();
    assert!(moved);

    let moved_again =
        ImageEditTaskRepo::advance_status(&mut conn, task.id, TaskStatus::Succeeded, None)
            .await
            .unwrap();
    assert!(!moved_again, "terminal rows must not change status");

    let stored = ImageEditTaskRepo::find_by_id_tx(&mut conn, task.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status_id, TaskStatus::Failed.id());
    assert_eq!(stored.error_message.as_deref(), Some("boom"));
    assert!(stored.completed_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_by_user_is_newest_first(pool: PgPool) {
    let upload = new_upload(&pool, "user-a", "image").await;
    let first = ImageEditTaskRepo::create(&pool, &new_task("user-a", upload.id))
        .await
        .unwrap();
    sqlx::query("UPDATE image_edit_tasks SET created_at = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(first.id)
        .execute(&pool)
        .await
        .unwrap();
    let second = ImageEditTaskRepo::create(&pool, &new_task("user-a", upload.id))
        .await
        .unwrap();
    let other_upload = new_upload(&pool, "user-b", "image").await;
    ImageEditTaskRepo::create(&pool, &new_task("user-b", other_upload.id))
        .await
        .unwrap();

    let tasks = ImageEditTaskRepo::list_by_user(&pool, "user-a", 20, 0)
        .await
        .unwrap();
    let ids: Vec<_> = tasks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let page = ImageEditTaskRepo::list_by_user(&pool, "user-a", 1, 1)
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, first.id);
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_result_urls_are_ignored(pool: PgPool) {
    let upload = new_upload(&pool, "user-a", "image").await;
    let task = ImageEditTaskRepo::create(&pool, &new_task("user-a", upload.id))
        .await
        .unwrap();
    let urls = vec![
        "https://results.example.com/1.png".to_string(),
        "https://results.example.com/2.png".to_string(),
    ];

    let mut conn = pool.acquire().await.unwrap();
    let inserted = ImageEditResultRepo::insert_many(&mut conn, task.id, &urls)
        .await
        .unwrap();
    assert_eq!(inserted, 2);
    let inserted_again = ImageEditResultRepo::insert_many(&mut conn, task.id, &urls)
        .await
        .unwrap();
    assert_eq!(inserted_again, 0);

    let results = ImageEditResultRepo::list_by_task(&pool, task.id).await.unwrap();
    assert_eq!(results.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_task_cascades_to_results(pool: PgPool) {
    let upload = new_upload(&pool, "user-a", "image").await;
    let task = ImageEditTaskRepo::create(&pool, &new_task("user-a", upload.id))
        .await
        .unwrap();
    let mut conn = pool.acquire().await.unwrap();
    ImageEditResultRepo::insert_many(
        &mut conn,
        task.id,
        &["https://results.example.com/a.png".to_string()],
    )
    .await
    .unwrap();
    drop(conn);

    assert!(!ImageEditTaskRepo::delete_for_user(&pool, task.id, "user-b")
        .await
        .unwrap());
    assert!(ImageEditTaskRepo::delete_for_user(&pool, task.id, "user-a")
        .await
        .unwrap());

    let remaining = ImageEditResultRepo::list_by_task(&pool, task.id).await.unwrap();
    assert!(remaining.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn saved_image_attaches_once_and_nulls_on_upload_delete(pool: PgPool) {
    let upload = new_upload(&pool, "user-a", "image").await;
    let task = ImageEditTaskRepo::create(&pool, &new_task("user-a", upload.id))
        .await
        .unwrap();
    let mut conn = pool.acquire().await.unwrap();
    ImageEditResultRepo::insert_many(
        &mut conn,
        task.id,
        &["https://results.example.com/a.png".to_string()],
    )
    .await
    .unwrap();
    let result = ImageEditResultRepo::list_by_task(&pool, task.id).await.unwrap()[0].clone();

    let saved_a = new_upload(&pool, "user-a", "image").await;
    let saved_b = new_upload(&pool, "user-a", "image").await;
    assert!(ImageEditResultRepo::attach_saved_image(&mut conn, result.id, saved_a.id)
        .await
        .unwrap());
    assert!(!ImageEditResultRepo::attach_saved_image(&mut conn, result.id, saved_b.id)
        .await
        .unwrap());

    let found = ImageEditResultRepo::find_for_user(&pool, result.id, "user-a")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.saved_image_id, Some(saved_a.id));
    assert!(ImageEditResultRepo::find_for_user(&pool, result.id, "user-b")
        .await
        .unwrap()
        .is_none());

    UploadRepo::delete_for_user(&pool, saved_a.id, "user-a")
        .await
        .unwrap()
        .unwrap();
    let after = ImageEditResultRepo::find_for_user(&pool, result.id, "user-a")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.saved_image_id, None);
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_original_image_cascades_to_tasks(pool: PgPool) {
    let upload = new_upload(&pool, "user-a", "image").await;
    let task = ImageEditTaskRepo::create(&pool, &new_task("user-a", upload.id))
        .await
        .unwrap();

    assert!(UploadRepo::delete_for_user(&pool, upload.id, "user-b")
        .await
        .unwrap()
        .is_none());
    let deleted = UploadRepo::delete_for_user(&pool, upload.id, "user-a")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(deleted.id, upload.id);

    assert!(ImageEditTaskRepo::find_for_user(&pool, task.id, "user-a")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_by_ids_returns_only_requested(pool: PgPool) {
    let a = new_upload(&pool, "user-a", "image").await;
    let b = new_upload(&pool, "user-a", "video").await;
    new_upload(&pool, "user-a", "image").await;

    let found = UploadRepo::find_by_ids(&pool, &[a.id, b.id]).await.unwrap();
    assert_eq!(found.len(), 2);
    assert!(UploadRepo::find_by_ids(&pool, &[]).await.unwrap().is_empty());
    assert!(a.is_image());
    assert!(!b.is_image());
}
