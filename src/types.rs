//! Core data model types for row mapping.
//!
//! A spreadsheet row is read as a list of [`Value`]s, matched against a [`FieldMap`] of
//! header labels, and turned into a [`Record`] keyed by the caller's output names.

use std::collections::HashMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{MapperError, MapperResult};

/// A single cell value.
///
/// Empty cells are read as `Text("")`, never as a missing value, so a row always has one value
/// per header column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// UTF-8 text (also used for empty cells and cell errors such as `#DIV/0!`).
    Text(String),
    /// Integral number.
    Int(i64),
    /// Non-integral number. Excel date cells surface here as their serial.
    Float(f64),
    /// Boolean.
    Bool(bool),
}

impl Value {
    /// The value used for null / empty cells.
    pub fn empty() -> Self {
        Value::Text(String::new())
    }

    /// Whether this is the empty-cell value.
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Text(s) if s.is_empty())
    }

    /// Numeric view of the value, parsing text when it holds a number.
    ///
    /// Useful for feeding a date cell to [`crate::datetime::excel_to_timestamp`].
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            Value::Bool(_) => None,
        }
    }

    /// Text view of the value, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// One output row: output key -> cell value, in header order.
///
/// Inserting a key that is already present replaces its value but keeps its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Output keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// `(key, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v.into());
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Header label -> output key translation table.
///
/// Labels are matched exactly as they appear in the header row. Headers without an entry are
/// dropped from output records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FieldMap {
    fields: HashMap<String, String>,
}

impl FieldMap {
    /// Create an empty field map. Reading with it yields no records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a field map from a JSON object such as `{"姓名": "name", "年龄": "age"}`.
    pub fn from_json_str(json: &str) -> MapperResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| MapperError::invalid_input(format!("invalid field map json: {e}")))
    }

    /// Add or replace one mapping.
    pub fn insert(&mut self, header: impl Into<String>, key: impl Into<String>) {
        self.fields.insert(header.into(), key.into());
    }

    /// Output key for a header label.
    pub fn key_for(&self, header: &str) -> Option<&str> {
        self.fields.get(header).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<H: Into<String>, K: Into<String>> FromIterator<(H, K)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (H, K)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (h, k) in iter {
            map.insert(h, k);
        }
        map
    }
}
