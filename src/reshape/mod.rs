//! Backend Record Reshaping
//!
//! Turns VictoriaLogs NDJSON output into Loki stream entries.
//!
//! - **Value**: tagged field values and numeric coercion
//! - **Record**: per-line reshaping with explicit skip reasons
//!
//! Reshaping a single line is pure; [`reshape_lines`] is the batch driver
//! that logs and counts skipped lines while preserving input order.

mod record;
mod value;

pub use record::{reshape, ReshapedEntry, SkipReason, INTEGER_FIELDS, TIMESTAMP_FORMAT, TIME_FIELD};
pub use value::FieldValue;

/// Result of reshaping a whole backend response body
#[derive(Debug, Default)]
pub struct ReshapeBatch {
    /// Surviving entries, in input order
    pub entries: Vec<ReshapedEntry>,
    /// Number of lines that produced no entry
    pub skipped: usize,
}

/// Reshape every line of an NDJSON body.
///
/// Leading and trailing whitespace of the body is ignored. Lines that fail
/// to reshape are logged at `warn` and dropped.
pub fn reshape_lines(body: &str) -> ReshapeBatch {
    let mut batch = ReshapeBatch::default();

    for (index, line) in body.trim().lines().enumerate() {
        match reshape(line) {
            Ok(entry) => batch.entries.push(entry),
            Err(reason) => {
                tracing::warn!(line = index + 1, reason = %reason, "Failed to parse log line");
                batch.skipped += 1;
            }
        }
    }

    batch
}
