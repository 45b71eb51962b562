//! Scalar query results

use crate::error::QueryError;
use rusqlite::types::ValueRef;
use serde::Serialize;
use std::fmt;

/// A single value taken from the first row and first column of a result set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ScalarValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl ScalarValue {
    /// Returns the text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ScalarValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Name of the SQLite storage class
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Null => "null",
            ScalarValue::Integer(_) => "integer",
            ScalarValue::Real(_) => "real",
            ScalarValue::Text(_) => "text",
            ScalarValue::Blob(_) => "blob",
        }
    }
}

/// Text that is not valid UTF-8 is rejected rather than repaired.
impl TryFrom<ValueRef<'_>> for ScalarValue {
    type Error = QueryError;

    fn try_from(value: ValueRef<'_>) -> Result<Self, Self::Error> {
        Ok(match value {
            ValueRef::Null => ScalarValue::Null,
            ValueRef::Integer(i) => ScalarValue::Integer(i),
            ValueRef::Real(f) => ScalarValue::Real(f),
            ValueRef::Text(t) => {
                let text = std::str::from_utf8(t).map_err(|source| QueryError::InvalidText {
                    bytes: t.to_vec(),
                    source,
                })?;
                ScalarValue::Text(text.to_string())
            }
            ValueRef::Blob(b) => ScalarValue::Blob(b.to_vec()),
        })
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "NULL"),
            ScalarValue::Integer(i) => write!(f, "{}", i),
            ScalarValue::Real(r) => write!(f, "{}", r),
            ScalarValue::Text(s) => write!(f, "{}", s),
            ScalarValue::Blob(b) => {
                write!(f, "X'")?;
                for byte in b {
                    write!(f, "{:02X}", byte)?;
                }
                write!(f, "'")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ScalarValue::Null.to_string(), "NULL");
        assert_eq!(ScalarValue::Integer(42).to_string(), "42");
        assert_eq!(ScalarValue::Text("v0.1.0".to_string()).to_string(), "v0.1.0");
        assert_eq!(ScalarValue::Blob(vec![0xde, 0xad]).to_string(), "X'DEAD'");
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&ScalarValue::Text("1.0.0".to_string())).unwrap();
        assert_eq!(json, r#"{"type":"text","value":"1.0.0"}"#);

        let json = serde_json::to_string(&ScalarValue::Null).unwrap();
        assert_eq!(json, r#"{"type":"null"}"#);
    }

    #[test]
    fn test_as_text() {
        assert_eq!(ScalarValue::Text("x".to_string()).as_text(), Some("x"));
        assert_eq!(ScalarValue::Integer(1).as_text(), None);
        assert!(ScalarValue::Null.is_null());
        assert_eq!(ScalarValue::Real(1.5).type_name(), "real");
    }

    #[test]
    fn test_from_value_ref() {
        let value = ScalarValue::try_from(ValueRef::Text(b"v0.0.1")).unwrap();
        assert_eq!(value, ScalarValue::Text("v0.0.1".to_string()));

        let value = ScalarValue::try_from(ValueRef::Blob(&[0xff, 0xfe])).unwrap();
        assert_eq!(value, ScalarValue::Blob(vec![0xff, 0xfe]));
    }

    #[test]
    fn test_non_utf8_text_rejected() {
        match ScalarValue::try_from(ValueRef::Text(b"v1.\xff")) {
            Err(QueryError::InvalidText { bytes, .. }) => assert_eq!(bytes, b"v1.\xff"),
            other => panic!("expected invalid text error, got {:?}", other),
        }
    }
}
