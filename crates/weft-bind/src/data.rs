#![forbid(unsafe_code)]

//! The mutable key-value state a binder projects onto its targets.
//!
//! A [`DataModel`] is a flat record of `String` keys to JSON values. Only
//! top-level keys participate in change tracking; nested values are opaque
//! payloads as far as the binder is concerned.

use serde_json::Value;

/// The record type backing a [`DataModel`].
pub type DataRecord = serde_json::Map<String, Value>;

/// Mutable key-value state, exclusively owned by one binder instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataModel {
    entries: DataRecord,
}

impl DataModel {
    /// An empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from a JSON object value. Non-object values yield an
    /// empty model.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(entries) => Self { entries },
            _ => Self::default(),
        }
    }

    /// Value for a top-level key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Insert or replace a top-level key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Remove a top-level key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the model has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// The backing record, for read-only consumers (expression evaluation).
    #[must_use]
    pub fn as_record(&self) -> &DataRecord {
        &self.entries
    }
}

impl From<DataRecord> for DataModel {
    fn from(entries: DataRecord) -> Self {
        Self { entries }
    }
}

impl FromIterator<(String, Value)> for DataModel {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// The shared emptiness predicate.
///
/// `true` for an absent value, `null`, a whitespace-only string, an empty
/// array, and an empty object; `false` for everything else, including `0`,
/// `false`, and non-empty composites. Used uniformly by generic rendering
/// and every handler to toggle the `not-set` visual state.
#[must_use]
pub fn is_not_set(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Bool(_) | Value::Number(_)) => false,
    }
}
