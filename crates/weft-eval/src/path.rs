#![forbid(unsafe_code)]

//! Absent-tolerant path resolution over JSON values.
//!
//! Paths use dotted segments with optional bracket indices: `status[0].label`
//! is rewritten to `status.0.label` and walked key by key. Resolution
//! short-circuits to `None` the moment any intermediate is absent or not
//! indexable; it never panics.

use serde_json::Value;

use crate::DataRecord;

/// Resolve `path` against a JSON value.
///
/// Returns `None` for a missing member, a non-numeric index into an array,
/// an empty segment, or a scalar intermediate.
#[must_use]
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let normalized = normalize(path);
    let mut current = root;
    for segment in normalized.split('.') {
        if segment.is_empty() {
            return None;
        }
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Resolve `path` against a data record: the first segment is looked up in
/// the record, the rest walk the value.
#[must_use]
pub fn resolve_in_record<'a>(data: &'a DataRecord, path: &str) -> Option<&'a Value> {
    let normalized = normalize(path);
    let mut segments = normalized.split('.');
    let first = segments.next().filter(|s| !s.is_empty())?;
    let mut current = data.get(first)?;
    for segment in segments {
        if segment.is_empty() {
            return None;
        }
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Rewrite bracket indices to dotted segments: `a[0].b` becomes `a.0.b`.
fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for ch in path.chars() {
        match ch {
            '[' => out.push('.'),
            ']' => {}
            other => out.push(other),
        }
    }
    out
}
