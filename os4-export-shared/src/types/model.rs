//! Dynamic model representation.
//!
//! Both the old snapshot and the new output store hold flat JSON objects.
//! `ModelExt` adds the lenient field accessors the migrators need on top of
//! `serde_json::Map`.

use serde_json::{Map, Value};

/// A single object of a collection, keyed by field name.
pub type Model = Map<String, Value>;

/// Field accessors for [`Model`].
///
/// Accessors never fail: a missing field, a `null` and a value of the wrong
/// type all read as "absent". Callers that need a field to exist turn the
/// `None` into an error themselves.
pub trait ModelExt {
    /// The `id` field.
    fn id(&self) -> Option<i64>;

    /// An integer field.
    fn int(&self, field: &str) -> Option<i64>;

    /// A list of integers. Missing or `null` fields read as an empty list and
    /// non-integer members are skipped.
    fn ids(&self, field: &str) -> Vec<i64>;

    /// A string field.
    fn text(&self, field: &str) -> Option<&str>;

    /// A boolean field, `false` unless the field is literally `true`.
    fn flag(&self, field: &str) -> bool;

    /// Copy the named fields that are present into a new model, in the order
    /// given.
    fn copy_fields(&self, fields: &[&str]) -> Model;

    /// Append `value` to the list stored under `field`, creating the list if
    /// the field is missing or not a list.
    fn push_to(&mut self, field: &str, value: Value);
}

impl ModelExt for Model {
    fn id(&self) -> Option<i64> {
        self.int("id")
    }

    fn int(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }

    fn ids(&self, field: &str) -> Vec<i64> {
        match self.get(field) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_i64).collect(),
            _ => Vec::new(),
        }
    }

    fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    fn flag(&self, field: &str) -> bool {
        matches!(self.get(field), Some(Value::Bool(true)))
    }

    fn copy_fields(&self, fields: &[&str]) -> Model {
        let mut copied = Model::new();
        for field in fields {
            if let Some(value) = self.get(*field) {
                copied.insert((*field).to_string(), value.clone());
            }
        }
        copied
    }

    fn push_to(&mut self, field: &str, value: Value) {
        let slot = self
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(items) => items.push(value),
            other => *other = Value::Array(vec![value]),
        }
    }
}

/// `true` for the values the old data model treats as "nothing set":
/// `null`, `false`, `0`, empty strings, lists and objects.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
