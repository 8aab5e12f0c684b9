//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or a transaction connection) as the first argument.

pub mod image_edit_result_repo;
pub mod image_edit_task_repo;
pub mod upload_repo;

pub use image_edit_result_repo::ImageEditResultRepo;
pub use image_edit_task_repo::ImageEditTaskRepo;
pub use upload_repo::UploadRepo;

/// Clamp a requested page size into `1..=max`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp a requested offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
