#![forbid(unsafe_code)]

//! The generic primitive render rule.
//!
//! Plain bound elements (no handler claimed them) are projected with one
//! shared routine: strip any residual binding marker, toggle the `not-set`
//! class, turn the value into display text (sequences joined with `", "`,
//! object entries represented by their `label`), coerce date-typed inputs
//! to an ISO date, and assign to the value slot when the element has one,
//! else to its text content.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use weft_dom::{Document, NodeId};

use crate::binder::BIND_ATTR;
use crate::data::is_not_set;

/// Class toggled on targets whose bound value is unset.
pub const NOT_SET_CLASS: &str = "not-set";

/// Apply the generic primitive render rule to one element.
pub(crate) fn render_primitive(doc: &Document, el: NodeId, value: Option<&Value>) {
    // Markers are consumed during bind(); stamped or dynamically inserted
    // content may still carry one.
    doc.remove_attr(el, BIND_ATTR);

    if is_not_set(value) {
        doc.add_class(el, NOT_SET_CLASS);
    } else {
        doc.remove_class(el, NOT_SET_CLASS);
    }

    let display = match value {
        None | Some(Value::Null) => String::new(),
        Some(v) if doc.attr(el, "type").as_deref() == Some("date") => date_display(v),
        Some(v) => value_display(v),
    };

    if doc.has_value_slot(el) {
        doc.set_value(el, &display);
    } else {
        doc.set_text_content(el, &display);
    }
}

/// Read the current value out of an element: the value slot when present,
/// else the text content.
pub(crate) fn read_element_value(doc: &Document, el: NodeId) -> String {
    doc.value(el).unwrap_or_else(|| doc.text_content(el))
}

/// Display text for a value. Sequences join their entries with `", "`,
/// using each entry's `label` when the entry is an object.
pub(crate) fn value_display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(entry_display)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .get("label")
            .map(value_display)
            .unwrap_or_else(|| serde_json::to_string(value).unwrap_or_default()),
    }
}

fn entry_display(entry: &Value) -> String {
    match entry {
        Value::Object(map) => map.get("label").map(value_display).unwrap_or_default(),
        other => value_display(other),
    }
}

/// Coerce a value into an ISO `YYYY-MM-DD` date string for date-typed
/// inputs. Unparseable values fall back to their plain display text.
pub(crate) fn date_display(value: &Value) -> String {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                return date.format("%Y-%m-%d").to_string();
            }
            if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
                return stamp.date_naive().format("%Y-%m-%d").to_string();
            }
            s.clone()
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|stamp| stamp.date_naive().format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        other => value_display(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn display_joins_sequences_with_labels() {
        let value = json!([{"label": "Red", "id": 1}, {"label": "Blue", "id": 2}]);
        assert_eq!(value_display(&value), "Red, Blue");

        let plain = json!(["a", "b"]);
        assert_eq!(value_display(&plain), "a, b");
    }

    #[test]
    fn display_of_scalars() {
        assert_eq!(value_display(&json!("x")), "x");
        assert_eq!(value_display(&json!(3)), "3");
        assert_eq!(value_display(&json!(false)), "false");
        assert_eq!(value_display(&Value::Null), "");
    }

    #[test]
    fn date_display_accepts_iso_and_rfc3339() {
        assert_eq!(date_display(&json!("2026-03-01")), "2026-03-01");
        assert_eq!(date_display(&json!("2026-03-01T10:30:00Z")), "2026-03-01");
        assert_eq!(date_display(&json!("not a date")), "not a date");
    }

    #[test]
    fn date_display_accepts_epoch_millis() {
        // 2026-03-01T00:00:00Z
        assert_eq!(date_display(&json!(1_772_323_200_000_i64)), "2026-03-01");
    }

    #[test]
    fn primitive_render_targets_value_slot_or_text() {
        let doc = Document::new();
        let input = doc.create_element("input");
        let div = doc.create_element("div");
        doc.append_child(doc.root(), input);
        doc.append_child(doc.root(), div);

        render_primitive(&doc, input, Some(&json!("typed")));
        assert_eq!(doc.value(input).as_deref(), Some("typed"));

        render_primitive(&doc, div, Some(&json!("shown")));
        assert_eq!(doc.text_content(div), "shown");
    }

    #[test]
    fn primitive_render_toggles_not_set_class() {
        let doc = Document::new();
        let div = doc.create_element("div");
        doc.append_child(doc.root(), div);

        render_primitive(&doc, div, None);
        assert!(doc.has_class(div, NOT_SET_CLASS));
        assert_eq!(doc.text_content(div), "");

        render_primitive(&doc, div, Some(&json!("x")));
        assert!(!doc.has_class(div, NOT_SET_CLASS));
    }

    #[test]
    fn primitive_render_strips_residual_marker() {
        let doc = Document::new();
        let div = doc.create_element("div");
        doc.set_attr(div, BIND_ATTR, "name");
        doc.append_child(doc.root(), div);

        render_primitive(&doc, div, Some(&json!("x")));
        assert!(!doc.has_attr(div, BIND_ATTR));
    }

    #[test]
    fn date_typed_input_coerces_value() {
        let doc = Document::new();
        let input = doc.create_element("input");
        doc.set_attr(input, "type", "date");
        doc.append_child(doc.root(), input);

        render_primitive(&doc, input, Some(&json!("2026-03-01T10:30:00Z")));
        assert_eq!(doc.value(input).as_deref(), Some("2026-03-01"));
    }
}
