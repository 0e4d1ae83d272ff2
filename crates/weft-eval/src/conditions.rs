#![forbid(unsafe_code)]

//! Conditional visibility and class markers.
//!
//! Two independent markers drive conditional rendering:
//!
//! - `show-if="expr"`: the `shown` class is added while the expression
//!   holds and removed while it does not.
//! - `class-if="expr:names"`: every space-separated class name after the
//!   colon is added while the expression holds and removed while it does
//!   not.
//!
//! Both markers may be present on the same element and are evaluated
//! independently. The pass is stateless: the owning component re-runs it
//! after any data change.
//!
//! # Invariants
//!
//! 1. An empty data record means "no context yet" and the pass is a no-op;
//!    existing classes are left untouched.
//! 2. Evaluation never mutates the data record.
//! 3. A malformed `class-if` (no colon) is skipped, never a panic.

use tracing::debug;
use weft_dom::{Document, NodeId};

use crate::DataRecord;
use crate::expr::evaluate_expression;

/// Visibility marker attribute.
pub const SHOW_IF_ATTR: &str = "show-if";
/// Conditional-class marker attribute.
pub const CLASS_IF_ATTR: &str = "class-if";
/// Class toggled by the visibility marker.
pub const SHOWN_CLASS: &str = "shown";

/// Evaluate the conditional markers on a single element.
pub fn evaluate_conditions(doc: &Document, node: NodeId, data: &DataRecord) {
    if data.is_empty() || !doc.is_element(node) {
        return;
    }

    if let Some(expr) = doc.attr(node, SHOW_IF_ATTR) {
        if evaluate_expression(&expr, data) {
            doc.add_class(node, SHOWN_CLASS);
        } else {
            doc.remove_class(node, SHOWN_CLASS);
        }
    }

    if let Some(marker) = doc.attr(node, CLASS_IF_ATTR) {
        match marker.split_once(':') {
            Some((expr, names)) => {
                let truthy = evaluate_expression(expr, data);
                for name in names.split_whitespace() {
                    if truthy {
                        doc.add_class(node, name);
                    } else {
                        doc.remove_class(node, name);
                    }
                }
            }
            None => debug!(marker, "class-if marker has no class list"),
        }
    }
}

/// Evaluate the root element, then every descendant carrying either marker,
/// in document order.
pub fn evaluate_conditions_within(doc: &Document, root: NodeId, data: &DataRecord) {
    evaluate_conditions(doc, root, data);
    let marked = doc.descendants_matching(root, |d, n| {
        d.has_attr(n, SHOW_IF_ATTR) || d.has_attr(n, CLASS_IF_ATTR)
    });
    for node in marked {
        evaluate_conditions(doc, node, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(value: serde_json::Value) -> DataRecord {
        value.as_object().cloned().expect("object literal")
    }

    fn setup() -> (Document, NodeId) {
        let doc = Document::new();
        let el = doc.create_element("div");
        doc.append_child(doc.root(), el);
        (doc, el)
    }

    #[test]
    fn show_if_toggles_shown_class() {
        let (doc, el) = setup();
        doc.set_attr(el, SHOW_IF_ATTR, "count > 0");

        evaluate_conditions(&doc, el, &record(json!({"count": 3})));
        assert!(doc.has_class(el, SHOWN_CLASS));

        evaluate_conditions(&doc, el, &record(json!({"count": 0})));
        assert!(!doc.has_class(el, SHOWN_CLASS));
    }

    #[test]
    fn class_if_adds_and_removes_listed_classes() {
        let (doc, el) = setup();
        doc.set_attr(el, CLASS_IF_ATTR, "state === 'urgent':highlight pulsing");

        evaluate_conditions(&doc, el, &record(json!({"state": "urgent"})));
        assert_eq!(
            doc.classes(el),
            vec!["highlight".to_owned(), "pulsing".to_owned()]
        );

        evaluate_conditions(&doc, el, &record(json!({"state": "calm"})));
        assert!(doc.classes(el).is_empty());
    }

    #[test]
    fn both_markers_evaluate_independently() {
        let (doc, el) = setup();
        doc.set_attr(el, SHOW_IF_ATTR, "count > 0");
        doc.set_attr(el, CLASS_IF_ATTR, "count > 5:big");

        evaluate_conditions(&doc, el, &record(json!({"count": 3})));
        assert!(doc.has_class(el, SHOWN_CLASS));
        assert!(!doc.has_class(el, "big"));

        evaluate_conditions(&doc, el, &record(json!({"count": 9})));
        assert!(doc.has_class(el, SHOWN_CLASS));
        assert!(doc.has_class(el, "big"));
    }

    #[test]
    fn empty_data_record_is_no_op() {
        let (doc, el) = setup();
        doc.set_attr(el, SHOW_IF_ATTR, "count > 0");
        doc.add_class(el, SHOWN_CLASS);

        evaluate_conditions(&doc, el, &DataRecord::new());
        // No context yet: the previously rendered state stays untouched.
        assert!(doc.has_class(el, SHOWN_CLASS));
    }

    #[test]
    fn class_list_splits_at_the_first_colon_only() {
        let (doc, el) = setup();
        // Everything after the first colon is the class list; a further
        // colon stays part of the (whitespace-split) class name.
        doc.set_attr(el, CLASS_IF_ATTR, "count > 0:is:ready done");

        evaluate_conditions(&doc, el, &record(json!({"count": 3})));
        assert_eq!(doc.classes(el), vec!["is:ready".to_owned(), "done".to_owned()]);

        evaluate_conditions(&doc, el, &record(json!({"count": 0})));
        assert!(doc.classes(el).is_empty());
    }

    #[test]
    fn malformed_class_if_is_skipped() {
        let (doc, el) = setup();
        doc.set_attr(el, CLASS_IF_ATTR, "count > 0");
        evaluate_conditions(&doc, el, &record(json!({"count": 3})));
        assert!(doc.classes(el).is_empty());
    }

    #[test]
    fn within_covers_root_and_descendants_in_order() {
        let (doc, el) = setup();
        doc.set_attr(el, SHOW_IF_ATTR, "ready === true");
        let child = doc.create_element("span");
        doc.set_attr(child, CLASS_IF_ATTR, "ready === true:ok");
        doc.append_child(el, child);
        let plain = doc.create_element("span");
        doc.append_child(el, plain);

        evaluate_conditions_within(&doc, el, &record(json!({"ready": true})));
        assert!(doc.has_class(el, SHOWN_CLASS));
        assert!(doc.has_class(child, "ok"));
        assert!(doc.classes(plain).is_empty());
    }
}
