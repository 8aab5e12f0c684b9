//! Typed HTTP client for the photo-edit API.
//!
//! - [`api::ApiClient`] -- one method per endpoint, bearer-authenticated.
//! - [`watcher::TaskWatcher`] -- polls a task on a fixed interval until it
//!   reaches a terminal status.

pub mod api;
pub mod models;
pub mod watcher;

pub use api::{ApiClient, ApiClientError, Deleted};
pub use models::{
    CreateTaskRequest, CreatedTask, TaskResult, TaskState, TaskStatus, TaskSummary, Upload,
};
pub use watcher::{TaskWatcher, DEFAULT_POLL_INTERVAL};
