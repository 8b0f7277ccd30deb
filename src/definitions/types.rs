// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Primitive field types, schemas and the dynamic values that flow through transforms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Int64,
    Float64,
    Bool,
    Timestamp,
}

impl FieldType {
    /// Whether sum/mean/min/max aggregations can be computed over this type.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Int64 | FieldType::Float64)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Int64 => "int64",
            FieldType::Float64 => "float64",
            FieldType::Bool => "bool",
            FieldType::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// A named, typed column.
///
/// # Example
/// ```yaml
/// - name: amount
///   type: float64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub dtype: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, dtype: FieldType) -> Self {
        Self {
            name: name.into(),
            dtype,
        }
    }
}

/// Ordered list of fields. Order is preserved exactly as declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema(pub Vec<Field>);

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self(fields)
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.0.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|f| f.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field names that appear more than once, each reported once.
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut duplicates = Vec::new();
        for field in &self.0 {
            if !seen.insert(field.name.as_str()) && !duplicates.contains(&field.name) {
                duplicates.push(field.name.clone());
            }
        }
        duplicates
    }
}

impl From<Vec<Field>> for Schema {
    fn from(fields: Vec<Field>) -> Self {
        Self(fields)
    }
}

/// A single cell value.
///
/// Deserializes untagged so that request payloads can be written as plain JSON
/// (`{"amount": 100.0}`); timestamps arrive as RFC 3339 strings and stay
/// `String` until [`Value::coerce`] is applied against a field type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    #[serde(skip_deserializing)]
    Timestamp(DateTime<Utc>),
    String(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int64",
            Value::Float(_) => "float64",
            Value::Timestamp(_) => "timestamp",
            Value::String(_) => "string",
        }
    }

    /// Whether this value may be stored in a column of `dtype`. Nulls fit anywhere.
    pub fn conforms_to(&self, dtype: FieldType) -> bool {
        match (self, dtype) {
            (Value::Null, _) => true,
            (Value::String(_), FieldType::String) => true,
            (Value::Int(_), FieldType::Int64) => true,
            (Value::Float(_) | Value::Int(_), FieldType::Float64) => true,
            (Value::Bool(_), FieldType::Bool) => true,
            (Value::Timestamp(_), FieldType::Timestamp) => true,
            _ => false,
        }
    }

    /// Convert a loosely typed value into `dtype` where the conversion is lossless.
    ///
    /// Used on request payloads parsed from JSON, where timestamps are strings and
    /// whole-number floats may have been written as integers.
    pub fn coerce(self, dtype: FieldType) -> Value {
        match (self, dtype) {
            (Value::Int(v), FieldType::Float64) => Value::Float(v as f64),
            (Value::String(s), FieldType::Timestamp) => match DateTime::parse_from_rfc3339(&s) {
                Ok(ts) => Value::Timestamp(ts.with_timezone(&Utc)),
                Err(_) => Value::String(s),
            },
            (value, _) => value,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Value::String(v) => f.write_str(v),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_duplicate_names() {
        let schema = Schema::new(vec![
            Field::new("user_id", FieldType::String),
            Field::new("amount", FieldType::Float64),
            Field::new("user_id", FieldType::String),
            Field::new("user_id", FieldType::String),
        ]);
        assert_eq!(schema.duplicate_names(), vec!["user_id".to_string()]);
    }

    #[test]
    fn test_value_conforms_to() {
        assert!(Value::Int(3).conforms_to(FieldType::Float64));
        assert!(!Value::Float(3.0).conforms_to(FieldType::Int64));
        assert!(Value::Null.conforms_to(FieldType::Timestamp));
        assert!(!Value::from("4111").conforms_to(FieldType::Int64));
    }

    #[test]
    fn test_value_untagged_json() {
        let values: Vec<Value> =
            serde_json::from_str(r#"[null, true, 7, 1.5, "2020-01-01T00:00:00Z", "Visa"]"#).unwrap();
        assert_eq!(values[0], Value::Null);
        assert_eq!(values[1], Value::Bool(true));
        assert_eq!(values[2], Value::Int(7));
        assert_eq!(values[3], Value::Float(1.5));
        assert_eq!(values[4], Value::from("2020-01-01T00:00:00Z"));
        assert_eq!(values[5], Value::from("Visa"));
    }

    #[test]
    fn test_date_like_strings_follow_declared_type() {
        let cases = vec![
            (FieldType::String, true, "string"),
            (FieldType::Timestamp, true, "timestamp"),
            (FieldType::Int64, false, "string"),
        ];

        for (dtype, conforms, type_name) in cases {
            let value: Value = serde_json::from_str(r#""2020-01-01T00:00:00Z""#).unwrap();
            let coerced = value.coerce(dtype);
            assert_eq!(coerced.conforms_to(dtype), conforms, "dtype {}", dtype);
            assert_eq!(coerced.type_name(), type_name, "dtype {}", dtype);
        }
    }

    #[test]
    fn test_value_coerce() {
        assert_eq!(Value::Int(100).coerce(FieldType::Float64), Value::Float(100.0));
        let ts = Value::from("2021-06-01T12:00:00Z").coerce(FieldType::Timestamp);
        assert!(matches!(ts, Value::Timestamp(_)));
        let not_ts = Value::from("yesterday").coerce(FieldType::Timestamp);
        assert_eq!(not_ts, Value::from("yesterday"));
    }
}
