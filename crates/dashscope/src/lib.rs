//! Client for the DashScope asynchronous image-edit API.
//!
//! [`backend::ImageEditBackend`] is the seam the task service depends on;
//! [`api::DashScopeClient`] is the production implementation and
//! [`poll::wait_for_completion`] drives a job to a terminal state.

pub mod api;
pub mod backend;
pub mod messages;
pub mod poll;

pub use api::{DashScopeClient, DashScopeConfig};
pub use backend::{CreateJob, DashScopeError, ImageEditBackend, RemoteJob, RemoteJobStatus};
