//! Shared application router builder.
//!
//! `main.rs` and the integration tests both call [`build_app_router`], so
//! tests exercise the same layers production runs.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Build the photo-edit [`Router`]: `/health` at the root, everything else
/// under `/api/v1`.
///
/// Layers run outermost first on the way in: CORS, request id, tracing,
/// request id echo, timeout, panic guard. Task creation and result saving
/// call the remote service inline, so the timeout bounds those calls too.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = build_cors_layer(config);
    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        // Load balancer probe; no auth, no version prefix.
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        // A panicking handler answers 500 instead of dropping the connection.
        .layer(CatchPanicLayer::new())
        // Slow remote job or bucket calls surface as 408 to the browser.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        // Echo the id so the front end can quote it in bug reports.
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        // One INFO span per request; task and upload logs nest under it.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Keep a caller-supplied x-request-id, mint a UUID otherwise.
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        // The web front end sends the bearer token cross-origin.
        .layer(cors)
        .with_state(state)
}

/// CORS for the configured front-end origins.
///
/// Only the verbs the API routes use are allowed. Panics at startup if an
/// origin does not parse.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
