//! Ordered key/value inputs for the builders.
//!
//! Both payloads keep keys in insertion order: placeholder numbering and
//! condition order follow it. Re-setting an existing key replaces the value in
//! place without moving the key.

use crate::error::{JoblyError, JoblyResult};
use crate::types::SqlValue;
use serde_json::{Map, Value};

/// Fields to change in a partial update, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePayload {
    entries: Vec<(String, SqlValue)>,
}

impl UpdatePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field (chainable).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field in place.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) {
        let field = field.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == field) {
            Some((_, v)) => *v = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.entries.iter().find(|(k, _)| k == field).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut SqlValue> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for UpdatePayload {
    type Error = JoblyError;

    /// Convert a JSON object (e.g. a PATCH body), keeping its key order.
    fn try_from(map: Map<String, Value>) -> JoblyResult<Self> {
        let mut payload = UpdatePayload::new();
        for (field, value) in map {
            payload.insert(field, SqlValue::from_json(value)?);
        }
        Ok(payload)
    }
}

/// A single search filter value.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        FilterValue::Int(v.into())
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Float(v)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Bool(v)
    }
}

/// Search filters, in request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPayload {
    entries: Vec<(String, FilterValue)>,
}

impl FilterPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter (chainable).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FilterValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Build from query-string pairs; every value is kept as text.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut payload = FilterPayload::new();
        for (k, v) in pairs {
            payload.insert(k, FilterValue::Text(v.into()));
        }
        payload
    }

    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for FilterPayload {
    type Error = JoblyError;

    fn try_from(map: Map<String, Value>) -> JoblyResult<Self> {
        let mut payload = FilterPayload::new();
        for (name, value) in map {
            let value = match value {
                Value::String(s) => FilterValue::Text(s),
                Value::Bool(b) => FilterValue::Bool(b),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => FilterValue::Int(i),
                    None => FilterValue::Float(n.as_f64().ok_or_else(|| {
                        JoblyError::bad_request(format!("Invalid value for filter '{name}'"))
                    })?),
                },
                _ => {
                    return Err(JoblyError::bad_request(format!(
                        "Invalid value for filter '{name}'"
                    )));
                }
            };
            payload.insert(name, value);
        }
        Ok(payload)
    }
}
