//! Record Reshaping
//!
//! Converts one VictoriaLogs NDJSON record into a Loki stream entry.
//!
//! # Record Layout
//!
//! ```text
//! {"_time":"2024-01-01T00:00:00Z","_stream":"...","labels.host":"h1","values.cpu":"12.5","msg":"x"}
//!
//!   stream:  {"labels_host":"h1","values_cpu":"12.5","msg":"x"}
//!   values:  [["1704067200000000000", "{\"msg\":\"x\",\"labels\":{\"host\":\"h1\"},\"values\":{\"cpu\":12.5}}"]]
//! ```

use chrono::{NaiveDateTime, TimeZone, Timelike, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::reshape::value::FieldValue;

/// Backend field carrying the record timestamp
pub const TIME_FIELD: &str = "_time";

/// Accepted `_time` layout (UTC, whole seconds)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Top-level identifier fields coerced to integers
pub const INTEGER_FIELDS: [&str; 3] = ["panelID", "ruleID", "schemaVersion"];

const METADATA_PREFIX: char = '_';
const LABELS_PREFIX: &str = "labels.";
const VALUES_PREFIX: &str = "values.";

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// A Loki stream entry carrying a single log line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReshapedEntry {
    /// Flattened scalar fields, stringified
    pub stream: IndexMap<String, String>,
    /// Exactly one `[timestamp_ns, message]` pair
    pub values: Vec<[String; 2]>,
}

impl ReshapedEntry {
    /// Timestamp of the entry in nanoseconds, as sent to the client
    pub fn timestamp_ns(&self) -> Option<&str> {
        self.values.first().map(|pair| pair[0].as_str())
    }

    /// Compact JSON message of the entry
    pub fn message(&self) -> Option<&str> {
        self.values.first().map(|pair| pair[1].as_str())
    }
}

/// Why a backend line produced no entry
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing timestamp")]
    MissingTimestamp,

    #[error("bad timestamp {value:?}: {reason}")]
    BadTimestamp { value: String, reason: String },

    #[error("failed to encode message: {0}")]
    Encode(serde_json::Error),
}

/// Nested namespace a cleaned key belongs to
enum Bucket<'a> {
    Label(&'a str),
    Value(&'a str),
    TopLevel,
}

impl<'a> Bucket<'a> {
    fn of(key: &'a str) -> Self {
        if let Some(rest) = key.strip_prefix(LABELS_PREFIX).filter(|r| !r.is_empty()) {
            Self::Label(rest)
        } else if let Some(rest) = key.strip_prefix(VALUES_PREFIX).filter(|r| !r.is_empty()) {
            Self::Value(rest)
        } else {
            Self::TopLevel
        }
    }
}

/// Reshape one backend line into a Loki stream entry
pub fn reshape(line: &str) -> Result<ReshapedEntry, SkipReason> {
    let record = match serde_json::from_str::<Value>(line)? {
        Value::Object(map) => map,
        _ => return Err(SkipReason::NotAnObject),
    };

    let ts_ns = parse_timestamp(record.get(TIME_FIELD))?;

    let cleaned: Vec<(String, FieldValue)> = record
        .into_iter()
        .filter(|(key, _)| !key.starts_with(METADATA_PREFIX))
        .map(|(key, value)| (key, FieldValue::from(value)))
        .collect();

    let stream = cleaned
        .iter()
        .filter_map(|(key, value)| {
            value
                .to_stream_string()
                .map(|s| (flatten_key(key), s))
        })
        .collect();

    let message = build_message(cleaned);
    let message = serde_json::to_string(&message).map_err(SkipReason::Encode)?;

    Ok(ReshapedEntry {
        stream,
        values: vec![[ts_ns.to_string(), message]],
    })
}

/// Parse `_time` into nanoseconds since the Unix epoch
fn parse_timestamp(value: Option<&Value>) -> Result<i64, SkipReason> {
    let raw = match value {
        None | Some(Value::Null) => return Err(SkipReason::MissingTimestamp),
        Some(Value::String(s)) if s.is_empty() => return Err(SkipReason::MissingTimestamp),
        Some(Value::String(s)) => s,
        Some(other) => {
            return Err(SkipReason::BadTimestamp {
                value: other.to_string(),
                reason: "not a string".to_string(),
            })
        }
    };

    let bad = |reason: &str| SkipReason::BadTimestamp {
        value: raw.clone(),
        reason: reason.to_string(),
    };

    // chrono skips surrounding whitespace and accepts `:60`; the fixed layout allows neither
    if raw.trim() != raw.as_str() {
        return Err(bad("surrounding whitespace"));
    }

    let naive = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|e| bad(&e.to_string()))?;
    if naive.nanosecond() >= 1_000_000_000 {
        return Err(bad("leap second"));
    }

    Utc.from_utc_datetime(&naive)
        .timestamp()
        .checked_mul(NANOS_PER_SECOND)
        .ok_or_else(|| bad("out of range"))
}

/// Bucket and coerce cleaned fields into the message object
fn build_message(cleaned: Vec<(String, FieldValue)>) -> Map<String, Value> {
    let mut top_level = Map::new();
    let mut labels = Map::new();
    let mut values = Map::new();

    for (key, value) in cleaned {
        match Bucket::of(&key) {
            Bucket::Label(rest) => {
                labels.insert(rest.to_string(), value.into());
            }
            Bucket::Value(rest) => {
                values.insert(rest.to_string(), value.coerce_numeric().into());
            }
            Bucket::TopLevel => {
                let value = if INTEGER_FIELDS.contains(&key.as_str()) {
                    value.coerce_integer()
                } else {
                    value
                };
                top_level.insert(key, value.into());
            }
        }
    }

    if !labels.is_empty() {
        top_level.insert("labels".to_string(), Value::Object(labels));
    }
    if !values.is_empty() {
        top_level.insert("values".to_string(), Value::Object(values));
    }

    top_level
}

/// `labels.host` -> `labels_host`
fn flatten_key(key: &str) -> String {
    key.replace('.', "_")
}
