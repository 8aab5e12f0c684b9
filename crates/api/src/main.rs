use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use photoedit_api::config::ServerConfig;
use photoedit_api::router::build_app_router;
use photoedit_api::state::AppState;
use photoedit_dashscope::{DashScopeClient, DashScopeConfig, ImageEditBackend};
use photoedit_payments::{StripeClient, StripeConfig};
use photoedit_pipeline::{ImageEditService, UploadService};
use photoedit_storage::{ObjectStore, S3Storage, StorageConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = photoedit_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    photoedit_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    photoedit_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Remote image-edit service ---
    let dashscope_config = DashScopeConfig::from_env();
    tracing::info!(
        base_url = %dashscope_config.base_url,
        model = %dashscope_config.model,
        "DashScope client configured",
    );
    let backend: Arc<dyn ImageEditBackend> = Arc::new(
        DashScopeClient::new(dashscope_config).expect("Failed to build DashScope HTTP client"),
    );

    // --- Object storage ---
    let storage_config = StorageConfig::from_env();
    let key_prefix = storage_config.key_prefix.clone();
    let storage: Arc<dyn ObjectStore> = Arc::new(S3Storage::connect(&storage_config).await);

    // --- Payments (optional) ---
    let payments = match StripeConfig::from_env() {
        Some(stripe_config) => {
            let client =
                StripeClient::new(stripe_config).expect("Failed to build Stripe HTTP client");
            tracing::info!("Stripe payments enabled");
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("Stripe keys not set; payment endpoints will return 503");
            None
        }
    };

    // --- App state ---
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        image_edits: Arc::new(ImageEditService::new(
            pool.clone(),
            Arc::clone(&backend),
            Arc::clone(&storage),
            key_prefix.clone(),
        )),
        uploads: Arc::new(UploadService::new(pool, Arc::clone(&storage), key_prefix)),
        payments,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default filter; `LOG_FORMAT=json` switches to
/// one JSON object per line.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "photoedit_api=debug,photoedit_pipeline=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
