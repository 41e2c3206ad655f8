//! Structured key/value fields attached to log messages
//!
//! This module provides:
//! - `FieldValue`: A scalar or list value carried by a field
//! - `Fields`: The copy-on-write field set owned by every logger

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    List(Vec<FieldValue>),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Uint(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl FieldValue {
    /// Convert to serde_json::Value for JSON serialization
    ///
    /// NaN and infinite floats have no JSON representation and fail.
    pub fn to_json_value(&self) -> Result<serde_json::Value, LoggerError> {
        Ok(match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Uint(u) => serde_json::Value::Number((*u).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| LoggerError::other(format!("unsupported value: {}", f)))?,
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(FieldValue::to_json_value)
                    .collect::<Result<_, _>>()?,
            ),
            FieldValue::Null => serde_json::Value::Null,
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::Uint(u)
    }
}

impl From<u32> for FieldValue {
    fn from(u: u32) -> Self {
        FieldValue::Uint(u as u64)
    }
}

impl From<usize> for FieldValue {
    fn from(u: usize) -> Self {
        FieldValue::Uint(u as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<f32> for FieldValue {
    fn from(f: f32) -> Self {
        FieldValue::Float(f as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Key/value fields attached to a logger.
///
/// Fields are immutable by convention: [`Fields::with`] and
/// [`Fields::with_fields`] return a fresh copy and leave the receiver
/// untouched. There is no removal operation; a derived field set only grows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields {
    fields: HashMap<String, FieldValue>,
}

impl Fields {
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// A structurally independent copy with the same pairs.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Copy plus one upsert.
    #[must_use]
    pub fn with<K, V>(&self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut copy = self.copy();
        copy.fields.insert(key.into(), value.into());
        copy
    }

    /// Copy with every pair of `other` upserted; `other` wins on duplicates.
    #[must_use]
    pub fn with_fields(&self, other: &Fields) -> Self {
        let mut copy = self.copy();
        for (key, value) in &other.fields {
            copy.fields.insert(key.clone(), value.clone());
        }
        copy
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Pairs ordered lexicographically by key.
    pub fn sorted(&self) -> Vec<(&String, &FieldValue)> {
        let mut pairs: Vec<_> = self.fields.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        pairs
    }

    pub fn into_inner(self) -> HashMap<String, FieldValue> {
        self.fields
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, FieldValue>> for Fields {
    fn from(fields: HashMap<String, FieldValue>) -> Self {
        Self { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_creation() {
        let fields = Fields::new();
        assert!(fields.is_empty());
    }

    #[test]
    fn test_copy_is_independent() {
        let original = Fields::new().with("key1", "value1").with("key2", 42);
        let mut copy = original.copy().into_inner();
        copy.insert("key3".to_string(), FieldValue::Bool(true));
        copy.insert("key1".to_string(), "changed".into());

        assert_eq!(original.len(), 2);
        assert!(!original.contains_key("key3"));
        assert_eq!(original.get("key1"), Some(&FieldValue::from("value1")));
    }

    #[test]
    fn test_with_does_not_mutate_receiver() {
        let base = Fields::new().with("a", 1);
        let derived = base.with("b", 2);

        assert_eq!(base.len(), 1);
        assert_eq!(derived.len(), 2);
        assert!(!base.contains_key("b"));
    }

    #[test]
    fn test_with_fields_later_wins() {
        let base = Fields::new().with("key", "old").with("keep", true);
        let other = Fields::new().with("key", "new").with("extra", 3.5);
        let merged = base.with_fields(&other);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get("key"), Some(&FieldValue::from("new")));
        assert_eq!(base.get("key"), Some(&FieldValue::from("old")));
    }

    #[test]
    fn test_sorted_pairs() {
        let fields: Fields = [("b", 2), ("a", 1), ("c", 3)].into_iter().collect();
        let keys: Vec<_> = fields.sorted().into_iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::from("x").to_string(), "x");
        assert_eq!(FieldValue::from(-4).to_string(), "-4");
        assert_eq!(FieldValue::from(1.5).to_string(), "1.5");
        assert_eq!(FieldValue::from(vec![1, 2]).to_string(), "[1 2]");
        assert_eq!(FieldValue::from(None::<i32>).to_string(), "null");
    }

    #[test]
    fn test_field_value_json() {
        assert_eq!(FieldValue::from(7u32).to_json_value().unwrap(), serde_json::json!(7));
        assert_eq!(
            FieldValue::from(vec!["a", "b"]).to_json_value().unwrap(),
            serde_json::json!(["a", "b"])
        );
        assert!(FieldValue::Null.to_json_value().unwrap().is_null());
        assert!(FieldValue::Float(f64::NAN).to_json_value().is_err());
        assert!(FieldValue::from(vec![1.0, f64::INFINITY]).to_json_value().is_err());
    }
}
