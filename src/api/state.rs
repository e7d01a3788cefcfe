//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;

use crate::backend::LogBackend;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Log backend queried once per request
    pub backend: Arc<dyn LogBackend>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Prometheus recorder handle, when one is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new AppState without a metrics recorder
    pub fn new(backend: Arc<dyn LogBackend>, config: ApiConfig) -> Self {
        Self {
            backend,
            config: Arc::new(config),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    /// Attach the handle used to render `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Limit forwarded when the client sends none
    pub default_limit: String,
    /// Tenant header read from inbound requests
    pub org_header: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3100,
            default_limit: "100".to_string(),
            org_header: "X-Scope-OrgID".to_string(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
