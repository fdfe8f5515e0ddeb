use axum::{
    http::Method,
    middleware,
    routing::{get, post},
    Router,
};
use hyper::Server;
use std::net::SocketAddr;
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

use crate::constants::{
    ROUTE_MARK_CODE_USED, ROUTE_PATHWAYS, ROUTE_SUBMIT_APPLICATION, ROUTE_SUBMIT_INTERESTS,
    ROUTE_SUBMIT_INTEREST_ALIAS, ROUTE_VALIDATE_CODE,
};
use crate::handlers::{
    health, mark_code_used, method_not_allowed, metrics_text, pathways, submit_application,
    submit_interests, track_request, validate_code,
};
use crate::state::AppState;

/// The `/api/*` routes alone, with request tracking.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route(
            ROUTE_VALIDATE_CODE,
            post(validate_code).fallback(method_not_allowed),
        )
        .route(
            ROUTE_MARK_CODE_USED,
            post(mark_code_used).fallback(method_not_allowed),
        )
        .route(
            ROUTE_SUBMIT_APPLICATION,
            post(submit_application).fallback(method_not_allowed),
        )
        .route(
            ROUTE_SUBMIT_INTERESTS,
            post(submit_interests).fallback(method_not_allowed),
        )
        .route(
            ROUTE_SUBMIT_INTEREST_ALIAS,
            post(submit_interests).fallback(method_not_allowed),
        )
        .route(ROUTE_PATHWAYS, get(pathways))
        .route_layer(middleware::from_fn(track_request))
        .with_state(state)
}

/// Create the HTTP server with all routes. Unmatched paths fall through to
/// the static front-end in `static_dir`, with `index.html` as the SPA entry.
pub fn create_server(state: AppState, static_dir: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let index = Path::new(static_dir).join("index.html");
    let site = ServeDir::new(static_dir).fallback(ServeFile::new(index));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        .merge(api_router(state))
        .fallback_service(site)
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(state: AppState, static_dir: &str, port: u16) -> anyhow::Result<()> {
    let app = create_server(state, static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server running on http://localhost:{port}");
    info!("Health check: http://localhost:{port}/health");
    info!("Serving front-end from {static_dir}");

    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
