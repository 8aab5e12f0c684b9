#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use photoedit_api::auth::jwt::{generate_access_token, JwtConfig};
use photoedit_api::config::ServerConfig;
use photoedit_api::router::build_app_router;
use photoedit_api::state::AppState;
use photoedit_dashscope::{CreateJob, DashScopeError, ImageEditBackend, RemoteJob, RemoteJobStatus};
use photoedit_payments::StripeClient;
use photoedit_pipeline::{ImageEditService, UploadService};
use photoedit_storage::MemoryStorage;

pub const JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";
pub const BUCKET_URL: &str = "https://bucket.example.com";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// A bearer token for `user_id` signed with the test secret.
pub fn token(user_id: &str) -> String {
    generate_access_token(user_id, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Fake remote service
// ---------------------------------------------------------------------------

/// In-process stand-in for the remote image-edit service.
///
/// Every job reports whatever status was last set with [`FakeBackend::set`].
pub struct FakeBackend {
    state: Mutex<(RemoteJobStatus, Vec<String>, u32)>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new((RemoteJobStatus::Pending, Vec::new(), 0)),
        })
    }

    pub fn set(&self, status: RemoteJobStatus, urls: &[&str]) {
        let mut state = self.state.lock().unwrap();
        state.0 = status;
        state.1 = urls.iter().map(|u| u.to_string()).collect();
    }
}

#[async_trait]
impl ImageEditBackend for FakeBackend {
    async fn create_job(&self, _job: &CreateJob) -> Result<String, DashScopeError> {
        let mut state = self.state.lock().unwrap();
        state.2 += 1;
        Ok(format!("remote-{}", state.2))
    }

    async fn query_job(&self, remote_task_id: &str) -> Result<RemoteJob, DashScopeError> {
        let state = self.state.lock().unwrap();
        Ok(RemoteJob {
            remote_task_id: remote_task_id.to_string(),
            status: state.0.clone(),
            result_urls: state.1.clone(),
            error_message: None,
        })
    }

    async fn download_result(&self, _url: &str) -> Result<Vec<u8>, DashScopeError> {
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build the full application router with a fake remote service, in-memory
/// storage, and payments disabled.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, FakeBackend::new(), None)
}

/// Build the full application router around the given fakes.
///
/// Uses [`build_app_router`] so tests exercise the same middleware stack
/// (CORS, request ID, timeout, tracing, panic recovery) as production.
pub fn build_test_app_with(
    pool: PgPool,
    backend: Arc<FakeBackend>,
    payments: Option<Arc<StripeClient>>,
) -> Router {
    let config = test_config();
    let storage = Arc::new(MemoryStorage::new(BUCKET_URL));

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        image_edits: Arc::new(ImageEditService::new(
            pool.clone(),
            backend,
            storage.clone(),
            "smartphoto",
        )),
        uploads: Arc::new(UploadService::new(pool, storage, "smartphoto")),
        payments,
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST a single-file multipart form with the file under the `file` field.
pub async fn upload_file(
    app: Router,
    token: &str,
    content_type: &str,
    bytes: &[u8],
) -> Response {
    upload_files(app, token, &[(content_type, bytes)]).await
}

/// Multipart upload with one `file` part per `(content_type, bytes)` entry.
pub async fn upload_files(app: Router, token: &str, files: &[(&str, &[u8])]) -> Response {
    let boundary = "photoedit-test-boundary";
    let mut body = Vec::new();
    for (content_type, bytes) in files {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"file\"; filename=\"upload.bin\"\r\n",
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/uploads")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}
