//! Field Values
//!
//! Tagged representation of a backend field and the numeric coercions
//! applied while building the Loki message.

use serde_json::{Number, Value};

/// A single field value from a backend record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    /// Always finite
    Float(f64),
    Bool(bool),
    /// Null, arrays, objects and integers outside the `i64` range
    Other(Value),
}

impl FieldValue {
    /// String form used for stream labels; `None` for non-scalars.
    /// Booleans render as `True`/`False`.
    pub fn to_stream_string(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Number::from_f64(*f).map(|n| n.to_string()),
            Self::Bool(true) => Some("True".to_string()),
            Self::Bool(false) => Some("False".to_string()),
            Self::Other(Value::Number(n)) => Some(n.to_string()),
            Self::Other(_) => None,
        }
    }

    /// Coerce a `values.*` field.
    ///
    /// Strings containing `.` become floats, other strings become integers,
    /// booleans become `0`/`1`. Anything that does not parse is returned
    /// unchanged.
    pub fn coerce_numeric(self) -> Self {
        match self {
            Self::String(s) => {
                let parsed = if s.contains('.') {
                    parse_float(&s)
                } else {
                    parse_int(&s)
                };
                parsed.unwrap_or(Self::String(s))
            }
            Self::Bool(b) => Self::Int(i64::from(b)),
            other => other,
        }
    }

    /// Coerce an integer identifier field.
    ///
    /// Floats truncate toward zero, booleans become `0`/`1`. Unparseable
    /// strings and floats outside the `i64` range are unchanged.
    pub fn coerce_integer(self) -> Self {
        match self {
            Self::String(s) => parse_int(&s).unwrap_or(Self::String(s)),
            Self::Float(f) => truncate_float(f).unwrap_or(Self::Float(f)),
            Self::Bool(b) => Self::Int(i64::from(b)),
            other => other,
        }
    }
}

fn truncate_float(f: f64) -> Option<FieldValue> {
    let truncated = f.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    (truncated >= i64::MIN as f64 && truncated < i64::MAX as f64)
        .then(|| FieldValue::Int(truncated as i64))
}

fn parse_int(s: &str) -> Option<FieldValue> {
    s.trim().parse::<i64>().ok().map(FieldValue::Int)
}

fn parse_float(s: &str) -> Option<FieldValue> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(FieldValue::Float)
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::String(s),
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if n.is_f64() {
                    match n.as_f64() {
                        Some(f) => Self::Float(f),
                        None => Self::Other(Value::Number(n)),
                    }
                } else {
                    Self::Other(Value::Number(n))
                }
            }
            other => Self::Other(other),
        }
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::String(s) => Value::String(s),
            FieldValue::Int(i) => Value::from(i),
            FieldValue::Float(f) => Value::from(f),
            FieldValue::Bool(b) => Value::Bool(b),
            FieldValue::Other(v) => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        assert_eq!(FieldValue::from(json!("x")), FieldValue::String("x".into()));
        assert_eq!(FieldValue::from(json!(7)), FieldValue::Int(7));
        assert_eq!(FieldValue::from(json!(-7)), FieldValue::Int(-7));
        assert_eq!(FieldValue::from(json!(1.5)), FieldValue::Float(1.5));
        assert_eq!(FieldValue::from(json!(true)), FieldValue::Bool(true));
        assert_eq!(FieldValue::from(json!(null)), FieldValue::Other(Value::Null));
        assert_eq!(
            FieldValue::from(json!(u64::MAX)),
            FieldValue::Other(json!(u64::MAX))
        );
    }

    #[test]
    fn test_scalar_stream_strings() {
        assert_eq!(FieldValue::from(json!("h1")).to_stream_string(), Some("h1".into()));
        assert_eq!(FieldValue::from(json!(42)).to_stream_string(), Some("42".into()));
        assert_eq!(FieldValue::from(json!(12.5)).to_stream_string(), Some("12.5".into()));
        assert_eq!(FieldValue::from(json!(false)).to_stream_string(), Some("False".into()));
        assert_eq!(FieldValue::from(json!(true)).to_stream_string(), Some("True".into()));
        assert_eq!(
            FieldValue::from(json!(u64::MAX)).to_stream_string(),
            Some(u64::MAX.to_string())
        );
    }

    #[test]
    fn test_non_scalars_have_no_stream_string() {
        for value in [json!(null), json!([1, 2]), json!({"a": 1})] {
            assert_eq!(FieldValue::from(value).to_stream_string(), None);
        }
    }

    #[test]
    fn test_coerce_numeric_strings() {
        assert_eq!(FieldValue::from(json!("12.5")).coerce_numeric(), FieldValue::Float(12.5));
        assert_eq!(FieldValue::from(json!("12")).coerce_numeric(), FieldValue::Int(12));
        assert_eq!(FieldValue::from(json!(" -3 ")).coerce_numeric(), FieldValue::Int(-3));
        assert_eq!(FieldValue::from(json!("1.5e3")).coerce_numeric(), FieldValue::Float(1500.0));
    }

    #[test]
    fn test_coerce_numeric_keeps_unparseable() {
        assert_eq!(
            FieldValue::from(json!("12.5.1")).coerce_numeric(),
            FieldValue::String("12.5.1".into())
        );
        assert_eq!(
            FieldValue::from(json!("high")).coerce_numeric(),
            FieldValue::String("high".into())
        );
        assert_eq!(
            FieldValue::from(json!("1e5")).coerce_numeric(),
            FieldValue::String("1e5".into())
        );
        assert_eq!(
            FieldValue::from(json!(null)).coerce_numeric(),
            FieldValue::Other(Value::Null)
        );
    }

    #[test]
    fn test_coerce_numeric_booleans() {
        assert_eq!(FieldValue::from(json!(true)).coerce_numeric(), FieldValue::Int(1));
        assert_eq!(FieldValue::from(json!(false)).coerce_numeric(), FieldValue::Int(0));
    }

    #[test]
    fn test_coerce_numeric_keeps_numbers() {
        assert_eq!(FieldValue::from(json!(3)).coerce_numeric(), FieldValue::Int(3));
        assert_eq!(FieldValue::from(json!(3.25)).coerce_numeric(), FieldValue::Float(3.25));
    }

    #[test]
    fn test_coerce_integer() {
        assert_eq!(FieldValue::from(json!("17")).coerce_integer(), FieldValue::Int(17));
        assert_eq!(
            FieldValue::from(json!("17.5")).coerce_integer(),
            FieldValue::String("17.5".into())
        );
        assert_eq!(
            FieldValue::from(json!("abc")).coerce_integer(),
            FieldValue::String("abc".into())
        );
    }

    #[test]
    fn test_coerce_integer_truncates_numbers() {
        assert_eq!(FieldValue::from(json!(4.0)).coerce_integer(), FieldValue::Int(4));
        assert_eq!(FieldValue::from(json!(17.9)).coerce_integer(), FieldValue::Int(17));
        assert_eq!(FieldValue::from(json!(-2.5)).coerce_integer(), FieldValue::Int(-2));
        assert_eq!(FieldValue::from(json!(true)).coerce_integer(), FieldValue::Int(1));
        assert_eq!(FieldValue::from(json!(1e300)).coerce_integer(), FieldValue::Float(1e300));
        assert_eq!(
            FieldValue::from(json!(null)).coerce_integer(),
            FieldValue::Other(Value::Null)
        );
    }

    #[test]
    fn test_into_json() {
        assert_eq!(Value::from(FieldValue::Float(12.5)), json!(12.5));
        assert_eq!(Value::from(FieldValue::Int(3)), json!(3));
        assert_eq!(Value::from(FieldValue::String("a".into())), json!("a"));
    }
}
