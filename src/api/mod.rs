//! Loki Bridge HTTP API
//!
//! Loki-compatible HTTP layer, built with Axum.
//!
//! # Endpoints
//!
//! ## Query
//! - `GET /loki/api/v1/query_range` - Run a LogQL query against VictoriaLogs
//!
//! ## Metrics
//! - `GET /metrics` - Prometheus exposition
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health` - Service status
//!
//! # Example
//!
//! ```rust,ignore
//! use loki_bridge::api::{serve, ApiConfig, AppState};
//! use loki_bridge::backend::{BackendConfig, VictoriaLogsClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = Arc::new(VictoriaLogsClient::new(BackendConfig::default())?);
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(backend, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let loki_routes =
        Router::new().route("/query_range", get(routes::query::query_range));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/loki/api/v1", loki_routes)
        .nest("/health", health_routes)
        // Registered after the tracking layer so scrapes are not counted
        .route_layer(middleware::from_fn(routes::metrics::track_requests))
        .route("/metrics", get(routes::metrics::render_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Loki bridge listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Loki bridge shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
