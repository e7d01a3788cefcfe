//! # Loki Bridge
//!
//! Loki-compatible query front-end for VictoriaLogs. Grafana (or any Loki
//! client) sends LogQL; the bridge rewrites it to LogsQL, runs it against
//! VictoriaLogs and reshapes the NDJSON records into Loki streams.
//!
//! ## Modules
//!
//! - [`translate`]: LogQL to LogsQL translation
//! - [`reshape`]: VictoriaLogs record to Loki stream entry
//! - [`backend`]: VictoriaLogs HTTP client
//! - [`api`]: Loki-compatible REST API with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use loki_bridge::{reshape, translate};
//!
//! let logsql = translate(r#"{app="api"} | json | level="error""#);
//! assert_eq!(logsql, r#"app: "api" and level: "error""#);
//!
//! let entry = reshape(r#"{"_time":"2024-01-01T00:00:00Z","labels.host":"h1","msg":"boom"}"#)
//!     .expect("valid record");
//! assert_eq!(entry.timestamp_ns(), Some("1704067200000000000"));
//! assert_eq!(entry.message(), Some(r#"{"msg":"boom","labels":{"host":"h1"}}"#));
//! ```

pub mod api;
pub mod backend;
pub mod config;
pub mod reshape;
pub mod translate;

pub use translate::{parse_source_query, translate, SourceQuery, TargetQuery};

pub use reshape::{reshape, reshape_lines, FieldValue, ReshapeBatch, ReshapedEntry, SkipReason};

pub use backend::{BackendConfig, BackendError, BackendQuery, LogBackend, VictoriaLogsClient};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError, LoadReport, LoggingConfig, ServerConfig, UpstreamConfig};
