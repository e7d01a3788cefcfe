//! LogQL to LogsQL Translation
//!
//! Rewrites a Loki query into the VictoriaLogs filter language.
//!
//! - **AST**: [`SourceQuery`] (LogQL subset) and [`TargetQuery`] (LogsQL conjunction)
//! - **Parser**: a small nom grammar for selector pairs and stage filters
//!
//! Translation is permissive: unparseable fragments are dropped instead of
//! rejected, and a query with no usable filters translates to `""`.
//!
//! # Example
//!
//! ```rust
//! use loki_bridge::translate::translate;
//!
//! assert_eq!(
//!     translate(r#"{app="foo"} | json | level="error""#),
//!     r#"app: "foo" and level: "error""#
//! );
//! ```

mod ast;
mod parser;

pub use ast::{FormatMarker, Matcher, SourceQuery, Stage, TargetQuery, Term};
pub use parser::parse_source_query;

/// Translate a (possibly URL-encoded) LogQL query into LogsQL
pub fn translate(source: &str) -> String {
    let decoded = decode_query(source);
    let query = parse_source_query(&decoded);

    for stage in &query.stages {
        if let Stage::Unsupported(raw) = stage {
            tracing::debug!(stage = %raw, "Dropping unsupported pipeline stage");
        }
    }

    query.to_target().to_string()
}

/// Percent-decode and trim a query string
fn decode_query(source: &str) -> String {
    let bytes = urlencoding::decode_binary(source.as_bytes());
    String::from_utf8_lossy(&bytes).trim().to_string()
}
