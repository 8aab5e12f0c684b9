//! Image-edit task service.
//!
//! Tasks are reconciled lazily: nothing runs in the background, and a task's
//! stored state only moves forward when its owner asks for its status. Held in
//! the API state as an `Arc<ImageEditService>`.

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::PgPool;

use photoedit_core::error::CoreError;
use photoedit_core::image_edit::{validate_create_request, CreateImageEditTask};
use photoedit_core::types::DbId;
use photoedit_core::uploads::{object_key, MediaType, EDITED_FOLDER};
use photoedit_dashscope::{CreateJob, ImageEditBackend, RemoteJobStatus};
use photoedit_db::models::image_edit::{CreateImageEditTaskRow, ImageEditTask};
use photoedit_db::models::status::TaskStatus;
use photoedit_db::models::upload::{CreateUpload, Upload};
use photoedit_db::repositories::{
    clamp_limit, clamp_offset, ImageEditResultRepo, ImageEditTaskRepo, UploadRepo,
};
use photoedit_storage::{ObjectStore, StoredObject};

use crate::error::{PipelineError, PipelineResult};
use crate::views::{CreatedTask, ResultView, TaskListItem, TaskStatusView};

/// Page size when a listing does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page a listing may request.
pub const MAX_PAGE_SIZE: i64 = 50;

/// Error message stored when the remote fails a job without saying why.
const UNKNOWN_FAILURE: &str = "unknown error";

/// Content type of images copied out of the remote service.
const SAVED_CONTENT_TYPE: &str = "image/png";

pub struct ImageEditService {
    pool: PgPool,
    backend: Arc<dyn ImageEditBackend>,
    storage: Arc<dyn ObjectStore>,
    key_prefix: String,
}

impl ImageEditService {
    pub fn new(
        pool: PgPool,
        backend: Arc<dyn ImageEditBackend>,
        storage: Arc<dyn ObjectStore>,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            backend,
            storage,
            key_prefix: key_prefix.into(),
        }
    }

    // ---- Create ----

    /// Submit a remote edit job for one of the caller's images.
    ///
    /// The remote job is created first; if that fails no task row exists.
    pub async fn create_task(
        &self,
        user_id: &str,
        input: &CreateImageEditTask,
    ) -> PipelineResult<CreatedTask> {
        validate_create_request(input)?;

        let image = UploadRepo::find_for_user(&self.pool, input.original_image_id, user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Upload",
                id: input.original_image_id,
            })?;

        if !image.is_image() {
            return Err(CoreError::Validation(format!(
                "Upload {} is a {}, not an image",
                image.id, image.media_type
            ))
            .into());
        }

        let job = CreateJob {
            base_image_url: image.url.clone(),
            function: input.edit_function,
            prompt: input.prompt.trim().to_string(),
            mask_image_url: input.mask_image_url.clone(),
            // The remote and the table both take single precision.
            strength: input.strength.map(|s| s as f32),
            count: input.image_count_or_default(),
        };
        let remote_task_id = self.backend.create_job(&job).await?;

        let task = ImageEditTaskRepo::create(
            &self.pool,
            &CreateImageEditTaskRow {
                user_id: user_id.to_string(),
                original_image_id: image.id,
                edit_function: job.function.as_str().to_string(),
                prompt: job.prompt,
                mask_image_url: job.mask_image_url,
                strength: job.strength,
                image_count: job.count,
                remote_task_id,
            },
        )
        .await?;

        tracing::info!(
            task_id = %task.id,
            user_id,
            remote_task_id = %task.remote_task_id,
            edit_function = %task.edit_function,
            "Image edit task created",
        );

        Ok(CreatedTask {
            task_id: task.id,
            status: TaskStatus::Pending.as_str(),
        })
    }

    // ---- Status ----

    /// Current status of a task, reconciling with the remote when needed.
    ///
    /// Terminal tasks are answered from the database without a remote call.
    pub async fn get_task_status(&self, user_id: &str, task_id: DbId) -> PipelineResult<TaskStatusView> {
        let task = self.find_owned_task(user_id, task_id).await?;
        let current = stored_status(&task)?;

        if current.is_terminal() {
            return self.build_status_view(task, current).await;
        }

        let remote = self.backend.query_job(&task.remote_task_id).await?;
        let observed = match &remote.status {
            RemoteJobStatus::Pending => TaskStatus::Pending,
            RemoteJobStatus::Running => TaskStatus::Running,
            RemoteJobStatus::Succeeded => TaskStatus::Succeeded,
            RemoteJobStatus::Failed => TaskStatus::Failed,
            RemoteJobStatus::Unknown(raw) => {
                tracing::warn!(
                    task_id = %task.id,
                    remote_task_id = %task.remote_task_id,
                    status = %raw,
                    "Remote reported an unrecognized status",
                );
                return Err(PipelineError::UnrecognizedRemoteStatus {
                    task_id: task.id,
                    status: raw.clone(),
                });
            }
        };

        if !current.can_advance_to(observed) {
            ImageEditTaskRepo::touch(&self.pool, task.id).await?;
            return self.build_status_view(task, current).await;
        }

        let error_message = (observed == TaskStatus::Failed)
            .then(|| remote.error_message.as_deref().unwrap_or(UNKNOWN_FAILURE));

        let mut tx = self.pool.begin().await?;
        let advanced =
            ImageEditTaskRepo::advance_status(&mut tx, task.id, observed, error_message).await?;

        let mut inserted = 0;
        if advanced && observed == TaskStatus::Succeeded {
            inserted = ImageEditResultRepo::insert_many(&mut tx, task.id, &remote.result_urls).await?;
        }

        let refreshed = ImageEditTaskRepo::find_by_id_tx(&mut tx, task.id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "ImageEditTask",
                id: task.id,
            })?;
        tx.commit().await?;

        if advanced {
            tracing::info!(
                task_id = %task.id,
                from = %current,
                to = %observed,
                results = inserted,
                "Image edit task advanced",
            );
        } else {
            tracing::debug!(task_id = %task.id, "Concurrent poll already advanced task");
        }

        let status = stored_status(&refreshed)?;
        self.build_status_view(refreshed, status).await
    }

    // ---- Delete / list ----

    /// Delete one of the caller's tasks together with its results.
    pub async fn delete_task(&self, user_id: &str, task_id: DbId) -> PipelineResult<()> {
        let deleted = ImageEditTaskRepo::delete_for_user(&self.pool, task_id, user_id).await?;
        if !deleted {
            return Err(CoreError::NotFound {
                entity: "ImageEditTask",
                id: task_id,
            }
            .into());
        }
        tracing::info!(task_id = %task_id, user_id, "Image edit task deleted");
        Ok(())
    }

    /// The caller's tasks, newest first, each with its original image and
    /// results.
    pub async fn list_tasks(
        &self,
        user_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> PipelineResult<Vec<TaskListItem>> {
        let limit = clamp_limit(limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
        let offset = clamp_offset(offset);

        let tasks = ImageEditTaskRepo::list_by_user(&self.pool, user_id, limit, offset).await?;
        if tasks.is_empty() {
            return Ok(Vec::new());
        }

        let image_ids: Vec<DbId> = tasks.iter().map(|t| t.original_image_id).collect();
        let task_ids: Vec<DbId> = tasks.iter().map(|t| t.id).collect();

        let (images, all_results) = futures::try_join!(
            UploadRepo::find_by_ids(&self.pool, &image_ids),
            ImageEditResultRepo::list_by_tasks(&self.pool, &task_ids),
        )?;

        let images: HashMap<DbId, Upload> = images.into_iter().map(|u| (u.id, u)).collect();
        let mut results: HashMap<DbId, Vec<_>> = HashMap::new();
        for result in all_results {
            results.entry(result.task_id).or_default().push(result);
        }

        let items = tasks
            .into_iter()
            .map(|task| TaskListItem {
                // Several tasks may share one original image.
                original_image: images.get(&task.original_image_id).cloned(),
                results: results.remove(&task.id).unwrap_or_default(),
                task,
            })
            .collect();

        Ok(items)
    }

    // ---- Save ----

    /// Copy a result image into the caller's storage and link it.
    ///
    /// Saving twice returns the same upload. If two saves race, the loser's
    /// copy is discarded and the winner's upload is returned.
    pub async fn save_result_locally(&self, user_id: &str, result_id: DbId) -> PipelineResult<Upload> {
        let result = ImageEditResultRepo::find_for_user(&self.pool, result_id, user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "ImageEditResult",
                id: result_id,
            })?;

        if let Some(existing) = self.existing_saved_upload(result.saved_image_id).await? {
            return Ok(existing);
        }

        let bytes = self.backend.download_result(&result.result_image_url).await?;
        let key = object_key(&self.key_prefix, Some(EDITED_FOLDER), "png");
        let stored = self.storage.put_object(&key, bytes, SAVED_CONTENT_TYPE).await?;

        // From here on the object has no row pointing at it until commit.
        let linked = match self.link_saved_object(user_id, result.id, &stored).await {
            Ok(linked) => linked,
            Err(e) => {
                self.discard_object(&stored.key).await;
                return Err(e);
            }
        };

        let Some(upload) = linked else {
            self.discard_object(&stored.key).await;

            let winner = ImageEditResultRepo::find_for_user(&self.pool, result_id, user_id)
                .await?
                .and_then(|r| r.saved_image_id);
            return self
                .existing_saved_upload(winner)
                .await?
                .ok_or_else(|| {
                    CoreError::Internal(format!("Result {result_id} lost its saved image")).into()
                });
        };

        tracing::info!(
            result_id = %result.id,
            upload_id = %upload.id,
            key = %upload.storage_key,
            "Result saved to storage",
        );

        Ok(upload)
    }

    // ---- private helpers ----

    async fn find_owned_task(&self, user_id: &str, task_id: DbId) -> PipelineResult<ImageEditTask> {
        ImageEditTaskRepo::find_for_user(&self.pool, task_id, user_id)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "ImageEditTask",
                    id: task_id,
                }
                .into()
            })
    }

    async fn build_status_view(
        &self,
        task: ImageEditTask,
        status: TaskStatus,
    ) -> PipelineResult<TaskStatusView> {
        let results = if status == TaskStatus::Succeeded {
            ImageEditResultRepo::list_by_task(&self.pool, task.id)
                .await?
                .into_iter()
                .map(ResultView::from)
                .collect()
        } else {
            Vec::new()
        };

        Ok(TaskStatusView {
            task_id: task.id,
            status,
            error_message: task.error_message,
            results,
        })
    }

    async fn existing_saved_upload(&self, saved_image_id: Option<DbId>) -> PipelineResult<Option<Upload>> {
        match saved_image_id {
            Some(id) => Ok(UploadRepo::find_by_id(&self.pool, id).await?),
            None => Ok(None),
        }
    }

    /// Insert the upload row for a stored copy and attach it to the result.
    ///
    /// Returns `None` when another save attached first; nothing is written then.
    async fn link_saved_object(
        &self,
        user_id: &str,
        result_id: DbId,
        stored: &StoredObject,
    ) -> PipelineResult<Option<Upload>> {
        let mut tx = self.pool.begin().await?;
        let upload = UploadRepo::create(
            &mut *tx,
            &CreateUpload {
                user_id: user_id.to_string(),
                storage_key: stored.key.clone(),
                url: stored.url.clone(),
                media_type: MediaType::Image.as_str().to_string(),
                content_type: SAVED_CONTENT_TYPE.to_string(),
                size_bytes: stored.size,
            },
        )
        .await?;

        if !ImageEditResultRepo::attach_saved_image(&mut tx, result_id, upload.id).await? {
            tx.rollback().await?;
            return Ok(None);
        }
        tx.commit().await?;

        Ok(Some(upload))
    }

    async fn discard_object(&self, key: &str) {
        if let Err(e) = self.storage.delete_object(key).await {
            tracing::warn!(key, error = %e, "Failed to remove orphaned object");
        }
    }
}

fn stored_status(task: &ImageEditTask) -> PipelineResult<TaskStatus> {
    TaskStatus::from_id(task.status_id).ok_or_else(|| {
        CoreError::Internal(format!(
            "Task {} has unknown status id {}",
            task.id, task.status_id
        ))
        .into()
    })
}
