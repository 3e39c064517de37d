//! Row value types shared by the source connector and the migration runner.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Scalar value read from the legacy relational store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// The value as an integer, if it is one.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SqlValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a string slice, if it is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// JSON rendition for the legacy payload snapshot.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            SqlValue::Null => Value::Null,
            SqlValue::Bool(v) => Value::Bool(*v),
            SqlValue::Int(v) => Value::from(*v),
            SqlValue::Float(v) => {
                serde_json::Number::from_f64(*v).map_or(Value::Null, Value::Number)
            }
            SqlValue::Text(v) => Value::String(v.clone()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

/// One row from the legacy store: the legacy identifier plus the full column
/// set in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    legacy_id: i64,
    fields: Vec<(String, SqlValue)>,
}

impl SourceRecord {
    /// Build a record from ordered columns. The `id` column is the legacy
    /// identifier and must be present and integral.
    pub fn new(fields: Vec<(String, SqlValue)>) -> Option<Self> {
        let legacy_id = fields
            .iter()
            .find(|(name, _)| name == "id")
            .and_then(|(_, v)| v.as_int())?;
        Some(Self { legacy_id, fields })
    }

    /// The immutable legacy identifier.
    #[must_use]
    pub fn legacy_id(&self) -> i64 {
        self.legacy_id
    }

    /// Look up a column value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, v)| v)
    }

    /// A column's text value, treating NULL and missing as absent.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(SqlValue::as_text).filter(|s| !s.is_empty())
    }

    /// Ordered columns.
    #[must_use]
    pub fn fields(&self) -> &[(String, SqlValue)] {
        &self.fields
    }

    /// The legacy payload snapshot: a JSON object preserving column order.
    #[must_use]
    pub fn payload(&self) -> Value {
        let mut map = Map::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            map.insert(name.clone(), value.to_json());
        }
        Value::Object(map)
    }
}

/// A bounded page of records produced by one paginated fetch.
#[derive(Debug, Default)]
pub struct RecordBatch {
    pub rows: Vec<SourceRecord>,
}

impl RecordBatch {
    #[must_use]
    pub fn new(rows: Vec<SourceRecord>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SourceRecord {
        SourceRecord::new(vec![
            ("id".into(), SqlValue::Int(7)),
            ("title".into(), SqlValue::Text("hello".into())),
            ("views".into(), SqlValue::Int(3)),
            ("score".into(), SqlValue::Float(0.5)),
            ("deleted".into(), SqlValue::Null),
        ])
        .unwrap()
    }

    #[test]
    fn legacy_id_comes_from_id_column() {
        assert_eq!(record().legacy_id(), 7);
    }

    #[test]
    fn record_without_id_is_rejected() {
        assert!(SourceRecord::new(vec![("title".into(), SqlValue::Text("x".into()))]).is_none());
        assert!(SourceRecord::new(vec![("id".into(), SqlValue::Text("7".into()))]).is_none());
    }

    #[test]
    fn payload_preserves_column_order() {
        let payload = record().payload();
        let keys: Vec<_> = payload.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["id", "title", "views", "score", "deleted"]);
    }

    #[test]
    fn text_treats_empty_as_absent() {
        let rec = SourceRecord::new(vec![
            ("id".into(), SqlValue::Int(1)),
            ("name".into(), SqlValue::Text(String::new())),
        ])
        .unwrap();
        assert_eq!(rec.text("name"), None);
        assert_eq!(rec.text("missing"), None);
        assert_eq!(record().text("title"), Some("hello"));
    }
}
