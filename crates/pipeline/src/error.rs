use photoedit_core::error::CoreError;
use photoedit_core::types::DbId;
use photoedit_dashscope::DashScopeError;
use photoedit_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Image edit service error: {0}")]
    Backend(#[from] DashScopeError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The remote reported a status we do not know. Nothing was persisted.
    #[error("Task {task_id}: unrecognized remote status '{status}'")]
    UnrecognizedRemoteStatus { task_id: DbId, status: String },
}

pub type PipelineResult<T> = Result<T, PipelineError>;
