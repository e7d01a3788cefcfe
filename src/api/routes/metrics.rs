//! Metrics Routes
//!
//! Prometheus exposition of the bridge's own metrics.
//!
//! - GET /metrics - Text exposition format

use axum::{
    extract::{MatchedPath, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;

use crate::api::state::AppState;

/// GET /metrics
///
/// Empty when no Prometheus recorder is installed.
pub async fn render_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

/// Count and time every routed request, grouping status codes by class
pub async fn track_requests(request: Request, next: Next) -> Response {
    let handler = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let start = Instant::now();
    let response = next.run(request).await;

    let status = status_class(response.status().as_u16());
    metrics::counter!(
        "loki_bridge_http_requests_total",
        "handler" => handler.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!("loki_bridge_http_request_duration_seconds", "handler" => handler)
        .record(start.elapsed().as_secs_f64());

    response
}

/// `404` -> `4xx`
fn status_class(status: u16) -> &'static str {
    match status / 100 {
        1 => "1xx",
        2 => "2xx",
        3 => "3xx",
        4 => "4xx",
        _ => "5xx",
    }
}
