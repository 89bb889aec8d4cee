use std::net::SocketAddr;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::routes;
use crate::state::SharedState;

pub fn router(state: SharedState) -> Router {
    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/upload", post(routes::upload::upload_image))
        .route("/predict", post(routes::predict::predict))
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

pub async fn run_on(addr: &str, state: SharedState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    let local: SocketAddr = listener.local_addr()?;
    info!("Server running on port {}", local.port());

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
