//! VictoriaLogs HTTP Client
//!
//! Issues LogsQL queries against the `/select/logsql/query` endpoint and
//! returns the raw NDJSON body.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::backend::{BackendQuery, LogBackend};

/// VictoriaLogs query client
pub struct VictoriaLogsClient {
    client: Client,
    config: BackendConfig,
}

/// Configuration for the VictoriaLogs client
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Full query endpoint URL
    pub url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Header used to forward the tenant id
    pub org_header: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://vmauth:9428/select/logsql/query".to_string(),
            request_timeout_ms: 30_000,
            org_header: "X-Scope-OrgID".to_string(),
        }
    }
}

impl VictoriaLogsClient {
    /// Create a new client with the given configuration
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| BackendError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Query parameters in the order VictoriaLogs receives them
    fn query_params<'a>(request: &'a BackendQuery) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![("query", request.query.as_str())];
        if let Some(start) = request.start.as_deref() {
            params.push(("start", start));
        }
        if let Some(end) = request.end.as_deref() {
            params.push(("end", end));
        }
        params.push(("limit", request.limit.as_str()));
        params
    }
}

#[async_trait]
impl LogBackend for VictoriaLogsClient {
    fn endpoint(&self) -> &str {
        &self.config.url
    }

    async fn query(&self, request: &BackendQuery) -> Result<String, BackendError> {
        let mut builder = self
            .client
            .get(&self.config.url)
            .query(&Self::query_params(request));

        if let Some(org_id) = request.forwarded_org_id() {
            builder = builder.header(self.config.org_header.as_str(), org_id);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout
            } else if e.is_connect() {
                BackendError::Unavailable(e.to_string())
            } else {
                BackendError::Request(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                message: text,
            });
        }

        response.text().await.map_err(BackendError::Request)
    }
}

/// Errors that can occur when querying VictoriaLogs
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("VictoriaLogs unavailable: {0}")]
    Unavailable(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("VictoriaLogs returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::HeaderMap, routing::get, Router};
    use std::collections::HashMap;

    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/select/logsql/query", addr)
    }

    fn client_for(url: String) -> VictoriaLogsClient {
        VictoriaLogsClient::new(BackendConfig {
            url,
            request_timeout_ms: 5_000,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = BackendConfig::default();
        assert_eq!(config.url, "http://vmauth:9428/select/logsql/query");
        assert_eq!(config.org_header, "X-Scope-OrgID");
    }

    #[test]
    fn test_query_params_omit_missing_bounds() {
        let request = BackendQuery {
            query: "app: \"foo\"".to_string(),
            limit: "100".to_string(),
            ..Default::default()
        };
        assert_eq!(
            VictoriaLogsClient::query_params(&request),
            vec![("query", "app: \"foo\""), ("limit", "100")]
        );

        let request = BackendQuery {
            start: Some("1700000000".to_string()),
            end: Some("1700003600".to_string()),
            ..request
        };
        assert_eq!(
            VictoriaLogsClient::query_params(&request),
            vec![
                ("query", "app: \"foo\""),
                ("start", "1700000000"),
                ("end", "1700003600"),
                ("limit", "100"),
            ]
        );
    }

    #[tokio::test]
    async fn test_query_forwards_params_and_org_header() {
        let router = Router::new().route(
            "/select/logsql/query",
            get(
                |Query(params): Query<HashMap<String, String>>, headers: HeaderMap| async move {
                    let org = headers
                        .get("X-Scope-OrgID")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-")
                        .to_string();
                    format!(
                        "{}|{}|{}",
                        params.get("query").cloned().unwrap_or_default(),
                        params.get("limit").cloned().unwrap_or_default(),
                        org
                    )
                },
            ),
        );
        let client = client_for(spawn_backend(router).await);

        let request = BackendQuery {
            query: "app: \"foo\"".to_string(),
            limit: "5".to_string(),
            org_id: Some("tenant-a".to_string()),
            ..Default::default()
        };
        let body = client.query(&request).await.unwrap();
        assert_eq!(body, "app: \"foo\"|5|tenant-a");

        let request = BackendQuery {
            org_id: Some(String::new()),
            ..request
        };
        let body = client.query(&request).await.unwrap();
        assert_eq!(body, "app: \"foo\"|5|-");
    }

    #[tokio::test]
    async fn test_query_non_success_status() {
        let router = Router::new().route(
            "/select/logsql/query",
            get(|| async { (axum::http::StatusCode::BAD_REQUEST, "cannot parse query") }),
        );
        let client = client_for(spawn_backend(router).await);

        let err = client.query(&BackendQuery::default()).await.unwrap_err();
        match err {
            BackendError::Status { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "cannot parse query");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_query_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{}/select/logsql/query", addr));
        let err = client.query(&BackendQuery::default()).await.unwrap_err();
        assert!(matches!(err, BackendError::Unavailable(_)));
    }
}
