//! Database-agnostic value model.
//!
//! Drivers map their engine-specific cell types into [`Value`], and everything
//! above the driver seam (dispatch, rendering) works on [`Value`] and [`Row`]
//! alone. The five variants mirror SQLite's fundamental types, which are the
//! common denominator of the engines this layer targets.

use serde_json::Value as JsonValue;
use std::fmt;

/// A single cell value in database-agnostic form.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Convert to a JSON value.
    ///
    /// If `decode_binary` is true, blobs are decoded as UTF-8 text when valid.
    /// Otherwise (or when decoding fails) blobs are base64 encoded.
    pub fn to_json(&self, decode_binary: bool) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Integer(v) => JsonValue::Number((*v).into()),
            Value::Real(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(v.to_string())),
            Value::Text(v) => JsonValue::String(v.clone()),
            Value::Blob(bytes) => decode_binary_value(bytes, decode_binary),
        }
    }

    /// Whether this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value renders right-aligned in table output.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Real(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Real(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::Blob(bytes) => match std::str::from_utf8(bytes) {
                Ok(s) => write!(f, "{}", s),
                Err(_) => {
                    use base64::{Engine as _, engine::general_purpose::STANDARD};
                    write!(f, "{}", STANDARD.encode(bytes))
                }
            },
        }
    }
}

/// Decode binary data to a JSON value.
///
/// If `decode_binary` is true, attempts to decode as UTF-8 text first.
/// Falls back to base64 encoding if not valid UTF-8 or if `decode_binary` is false.
pub fn decode_binary_value(bytes: &[u8], decode_binary: bool) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    if decode_binary {
        match std::str::from_utf8(bytes) {
            Ok(s) => JsonValue::String(s.to_string()),
            Err(_) => JsonValue::String(STANDARD.encode(bytes)),
        }
    } else {
        JsonValue::String(STANDARD.encode(bytes))
    }
}

/// One fetched row, values in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Cell at `idx`, or None past the end.
    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Convert to a JSON object keyed by the given column names.
    ///
    /// Columns and values are zipped; a length mismatch truncates to the
    /// shorter side.
    pub fn to_json_map(
        &self,
        columns: &[String],
        decode_binary: bool,
    ) -> serde_json::Map<String, JsonValue> {
        columns
            .iter()
            .zip(self.values.iter())
            .map(|(name, value)| (name.clone(), value.to_json(decode_binary)))
            .collect()
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Real(1.5).to_string(), "1.5");
        assert_eq!(Value::Text("abc".into()).to_string(), "abc");
        assert_eq!(Value::Blob(b"raw".to_vec()).to_string(), "raw");
    }

    #[test]
    fn test_blob_display_falls_back_to_base64() {
        let v = Value::Blob(vec![0xFF, 0xFE, 0x00, 0x01]);
        assert_eq!(v.to_string(), "//4AAQ==");
    }

    #[test]
    fn test_value_to_json() {
        assert_eq!(Value::Null.to_json(false), JsonValue::Null);
        assert_eq!(Value::Integer(7).to_json(false), serde_json::json!(7));
        assert_eq!(Value::Real(2.5).to_json(false), serde_json::json!(2.5));
        assert_eq!(
            Value::Text("x".into()).to_json(false),
            serde_json::json!("x")
        );
    }

    #[test]
    fn test_decode_binary_value_with_valid_utf8() {
        let bytes = b"hello world";
        let result = decode_binary_value(bytes, true);
        assert_eq!(result, JsonValue::String("hello world".to_string()));

        let result = decode_binary_value(bytes, false);
        assert_eq!(result, JsonValue::String("aGVsbG8gd29ybGQ=".to_string()));
    }

    #[test]
    fn test_decode_binary_value_with_invalid_utf8() {
        let bytes: &[u8] = &[0xFF, 0xFE, 0x00, 0x01];
        let result = decode_binary_value(bytes, true);
        assert_eq!(result, JsonValue::String("//4AAQ==".to_string()));

        let result = decode_binary_value(bytes, false);
        assert_eq!(result, JsonValue::String("//4AAQ==".to_string()));
    }

    #[test]
    fn test_nan_renders_as_string() {
        let v = Value::Real(f64::NAN);
        assert!(matches!(v.to_json(false), JsonValue::String(_)));
    }

    #[test]
    fn test_row_to_json_map() {
        let row = Row::new(vec![Value::Integer(1), Value::Text("a".into())]);
        let columns = vec!["id".to_string(), "name".to_string()];
        let map = row.to_json_map(&columns, false);
        assert_eq!(map["id"], serde_json::json!(1));
        assert_eq!(map["name"], serde_json::json!("a"));
    }

    #[test]
    fn test_row_access() {
        let row = Row::new(vec![Value::Integer(1)]);
        assert_eq!(row.len(), 1);
        assert_eq!(row.get(0), Some(&Value::Integer(1)));
        assert_eq!(row.get(1), None);
        assert!(row.get(0).is_some_and(|v| v.is_numeric()));
    }
}
