//! Query Routes
//!
//! Loki-compatible log query endpoint backed by VictoriaLogs.
//!
//! - GET /loki/api/v1/query_range - Translate, forward, reshape

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{QueryRangeParams, QueryRangeResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::backend::BackendQuery;
use crate::reshape::reshape_lines;
use crate::translate::translate;

/// GET /loki/api/v1/query_range
///
/// Translates the LogQL query, runs exactly one backend query and returns
/// every record that could be reshaped. Records that cannot be reshaped are
/// logged and left out; backend failures fail the request.
pub async fn query_range(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<QueryRangeParams>,
) -> ApiResult<Json<QueryRangeResponse>> {
    let org_id = headers
        .get(state.config.org_header.as_str())
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let request = BackendQuery {
        query: translate(&params.query),
        start: params.start,
        end: params.end,
        limit: params
            .limit
            .unwrap_or_else(|| state.config.default_limit.clone()),
        org_id,
    };

    tracing::info!(
        backend = %state.backend.endpoint(),
        query = %request.query,
        start = ?request.start,
        end = ?request.end,
        limit = %request.limit,
        org_id = ?request.forwarded_org_id(),
        "Querying VictoriaLogs"
    );

    let body = match state.backend.query(&request).await {
        Ok(body) => {
            metrics::counter!("loki_bridge_backend_requests_total", "outcome" => "success")
                .increment(1);
            body
        }
        Err(e) => {
            metrics::counter!("loki_bridge_backend_requests_total", "outcome" => "error")
                .increment(1);
            return Err(e.into());
        }
    };

    let batch = reshape_lines(&body);

    metrics::counter!("loki_bridge_lines_total", "outcome" => "reshaped")
        .increment(batch.entries.len() as u64);
    metrics::counter!("loki_bridge_lines_total", "outcome" => "skipped")
        .increment(batch.skipped as u64);

    tracing::info!(
        entries = batch.entries.len(),
        skipped = batch.skipped,
        "Reshaped VictoriaLogs response"
    );

    Ok(Json(QueryRangeResponse::streams(batch.entries)))
}
