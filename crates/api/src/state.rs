use std::sync::Arc;

use photoedit_payments::StripeClient;
use photoedit_pipeline::{ImageEditService, UploadService};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: photoedit_db::DbPool,
    /// Server configuration (read by the auth extractor).
    pub config: Arc<ServerConfig>,
    /// Image-edit task lifecycle.
    pub image_edits: Arc<ImageEditService>,
    /// Direct uploads.
    pub uploads: Arc<UploadService>,
    /// Stripe client; `None` when payments are not configured.
    pub payments: Option<Arc<StripeClient>>,
}
