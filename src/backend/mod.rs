//! Log Backend
//!
//! The single outbound dependency of the bridge: a log store that accepts a
//! LogsQL query and answers with newline-delimited JSON records.
//!
//! [`LogBackend`] is the seam the HTTP layer talks to;
//! [`VictoriaLogsClient`] is the production implementation.

mod client;

pub use client::{BackendConfig, BackendError, VictoriaLogsClient};

use async_trait::async_trait;

/// One outbound query, already translated to LogsQL
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendQuery {
    /// LogsQL filter expression (may be empty)
    pub query: String,
    /// Opaque lower time bound, passed through unmodified
    pub start: Option<String>,
    /// Opaque upper time bound, passed through unmodified
    pub end: Option<String>,
    /// Maximum number of records
    pub limit: String,
    /// Tenant id from the inbound request
    pub org_id: Option<String>,
}

impl BackendQuery {
    /// Tenant id to forward; empty values are not forwarded
    pub fn forwarded_org_id(&self) -> Option<&str> {
        self.org_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// A log store queried with LogsQL
#[async_trait]
pub trait LogBackend: Send + Sync {
    /// Endpoint URL, for logging and health output
    fn endpoint(&self) -> &str;

    /// Run the query and return the raw NDJSON response body
    async fn query(&self, request: &BackendQuery) -> Result<String, BackendError>;
}
