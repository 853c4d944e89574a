use crate::common::Document;
use crate::errors::{ErrorKind, IndexSyncError, IndexSyncResult};
use itertools::Itertools;
use std::fmt::{Debug, Display, Formatter};

/// A single value inside a [Document] sent to the store.
///
/// # Purpose
/// Index requests only ever carry a handful of value shapes: sort directions
/// (`1`/`-1`), index type markers such as `"2d"`, option flags, names and
/// numeric bounds. Compound key expressions may nest further, so documents and
/// arrays are representable too.
///
/// # Characteristics
/// - **Numeric equality**: `I32(1) == I64(1)`, integers of different widths
///   compare by value
/// - **Default**: Defaults to `Null`
///
/// # Usage
/// ```rust
/// use index_sync::common::Value;
///
/// let direction: Value = 1.into();
/// let marker = Value::from("2d");
/// assert_eq!(direction, Value::I64(1));
/// assert_eq!(marker.as_str(), Some("2d"));
/// ```
#[derive(Clone, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    /// Boolean flag.
    Bool(bool),
    /// 32-bit integer, used for directions and geo bounds.
    I32(i32),
    /// 64-bit integer.
    I64(i64),
    /// Floating point number.
    F64(f64),
    /// Text value.
    String(String),
    /// Ordered list of values.
    Array(Vec<Value>),
    /// Nested document.
    Document(Document),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the value as an `i64` if it is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I32(v) => Some(*v as i64),
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(v) => Some(v),
            _ => None,
        }
    }

    /// Converts a parsed JSON value into a store value.
    ///
    /// Integers that fit in 32 bits become [Value::I32] so that parsed key
    /// directions have the same shape as generated ones.
    pub fn from_json(json: serde_json::Value) -> IndexSyncResult<Value> {
        let value = match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    match i32::try_from(i) {
                        Ok(small) => Value::I32(small),
                        Err(_) => Value::I64(i),
                    }
                } else if let Some(f) = n.as_f64() {
                    Value::F64(f)
                } else {
                    return Err(IndexSyncError::new(
                        &format!("Number {} is out of range", n),
                        ErrorKind::ParseError,
                    ));
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(Value::from_json)
                    .collect::<IndexSyncResult<Vec<_>>>()?,
            ),
            serde_json::Value::Object(map) => {
                let mut doc = Document::new();
                for (key, item) in map {
                    doc.put(key, Value::from_json(item)?);
                }
                Value::Document(doc)
            }
        };
        Ok(value)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.as_i64(), other.as_i64()) {
            return a == b;
        }

        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => (a.is_nan() && b.is_nan()) || a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Document(a), Value::Document(b)) => a == b,
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "\"{}\"", v),
            Value::Array(items) => write!(f, "[{}]", items.iter().join(", ")),
            Value::Document(doc) => write!(f, "{}", doc),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn integers_compare_across_widths() {
        assert_eq!(Value::I32(-1), Value::I64(-1));
        assert_ne!(Value::I32(1), Value::I32(-1));
        assert_ne!(Value::I32(1), Value::F64(1.0));
    }

    #[test]
    fn from_json_narrows_small_integers() {
        let value = Value::from_json(serde_json::json!(1)).unwrap();
        assert!(matches!(value, Value::I32(1)));

        let value = Value::from_json(serde_json::json!(5_000_000_000i64)).unwrap();
        assert!(matches!(value, Value::I64(5_000_000_000)));

        let value = Value::from_json(serde_json::json!(0.5)).unwrap();
        assert!(matches!(value, Value::F64(_)));
    }

    #[test]
    fn from_json_keeps_object_key_order() {
        let json: serde_json::Value = serde_json::from_str(r#"{"z": 1, "a": -1}"#).unwrap();
        let value = Value::from_json(json).unwrap();
        let doc = value.as_document().unwrap();
        assert_eq!(doc.keys(), vec!["z", "a"]);
    }

    #[test]
    fn from_json_converts_nested_values() {
        let json = serde_json::json!({"loc": "2d", "tags": [1, true, null]});
        let value = Value::from_json(json).unwrap();
        let expected = doc! {
            "loc": "2d",
            "tags": [1, true, (Value::Null)],
        };
        assert_eq!(value, Value::Document(expected));
    }

    #[test]
    fn display_renders_json_like_text() {
        assert_eq!(Value::from("2d").to_string(), "\"2d\"");
        assert_eq!(Value::from(-1).to_string(), "-1");
        assert_eq!(Value::from(vec![1, 2]).to_string(), "[1, 2]");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn accessors_match_variants() {
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(7).as_i64(), Some(7));
        assert_eq!(Value::from("x").as_bool(), None);
        assert!(Value::default().is_null());
    }
}
