//! Image-edit task lifecycle and upload handling.
//!
//! [`ImageEditService`] creates remote edit jobs, reconciles their status on
//! demand, and copies results into owned storage. [`UploadService`] covers
//! direct uploads. Both are constructed once at startup and shared through
//! the API state.

pub mod error;
pub mod service;
pub mod uploads;
pub mod views;

pub use error::PipelineError;
pub use service::{ImageEditService, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use uploads::UploadService;
pub use views::{CreatedTask, ResultView, TaskListItem, TaskStatusView};
