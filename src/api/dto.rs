//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::reshape::ReshapedEntry;

// ============================================
// LOKI QUERY DTOs
// ============================================

/// Query string of `GET /loki/api/v1/query_range`
///
/// Other Loki parameters (`direction`, `step`, ...) are accepted and ignored.
#[derive(Debug, Deserialize)]
pub struct QueryRangeParams {
    /// LogQL query
    #[serde(default)]
    pub query: String,
    /// Start bound, passed through unmodified
    pub start: Option<String>,
    /// End bound, passed through unmodified
    pub end: Option<String>,
    /// Maximum number of entries
    pub limit: Option<String>,
}

/// Loki query response envelope
#[derive(Debug, Serialize)]
pub struct QueryRangeResponse {
    /// Always "success"
    pub status: String,
    pub data: StreamsData,
}

/// `data` member of a streams response
#[derive(Debug, Serialize)]
pub struct StreamsData {
    /// Always "streams"
    #[serde(rename = "resultType")]
    pub result_type: String,
    pub result: Vec<ReshapedEntry>,
}

impl QueryRangeResponse {
    /// Wrap reshaped entries in a successful streams response
    pub fn streams(result: Vec<ReshapedEntry>) -> Self {
        Self {
            status: "success".to_string(),
            data: StreamsData {
                result_type: "streams".to_string(),
                result,
            },
        }
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status
    pub status: String,
    /// Backend query endpoint
    pub backend: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
