#![forbid(unsafe_code)]

//! Checkbox-group handler: claims `check-options`-classed containers.
//!
//! A row per option is stamped from the sibling template; checkbox rows
//! accumulate a multi-valued selection, radio rows (data `isCheckbox`
//! absent or false) replace it. Every change writes the selection back
//! through the binder without requesting a re-render: the stamped inputs
//! already show the right checked state and a full restamp mid-interaction
//! would drop focus.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;
use weft_dom::{Document, EventKind, NodeId, SubscriptionSet};

use crate::binder::{BIND_ATTR, BinderLink};
use crate::data::DataModel;
use crate::handler::{Handler, HandlerContext, HandlerSpec};
use crate::render::NOT_SET_CLASS;

use super::{SELECTION_KEY, bound_fields, entry_field, identity_of, stamp_template};

const CHECK_OPTIONS_CLASS: &str = "check-options";
const CHECKBOX_FLAG_KEY: &str = "isCheckbox";
const GROUP_NAME_KEY: &str = "label";

pub(crate) fn spec() -> HandlerSpec {
    HandlerSpec {
        name: "check",
        matches: |doc, el| doc.has_class(el, CHECK_OPTIONS_CLASS),
        build: |ctx| Box::new(CheckHandler::new(ctx)),
    }
}

/// Checkbox / radio group over a template-stamped option list.
pub struct CheckHandler {
    element: NodeId,
    link: BinderLink,
    options: Vec<Value>,
    current: Rc<RefCell<Vec<Value>>>,
    subscriptions: SubscriptionSet,
}

impl CheckHandler {
    pub(crate) fn new(ctx: HandlerContext<'_>) -> Self {
        Self {
            element: ctx.element,
            link: ctx.link,
            options: Vec::new(),
            current: Rc::new(RefCell::new(Vec::new())),
            subscriptions: SubscriptionSet::new(),
        }
    }

    fn row_template(&self, doc: &Document) -> Option<NodeId> {
        let parent = doc.parent(self.element)?;
        doc.find_descendant(parent, |d, n| d.tag(n).as_deref() == Some("template"))
    }

    fn is_check_input(doc: &Document, node: NodeId) -> bool {
        doc.tag(node).as_deref() == Some("input")
            && matches!(doc.attr(node, "type").as_deref(), Some("checkbox" | "radio"))
    }

    fn write_back(link: &BinderLink, current: &Rc<RefCell<Vec<Value>>>) {
        let selection = current.borrow().clone();
        let _ = link.update_key(SELECTION_KEY, Value::Array(selection), false);
    }

    fn stamp_rows(&mut self, doc: &Document, template: NodeId, accumulate: bool, group: &str) {
        self.subscriptions.clear();
        doc.clear_children(self.element);

        let chosen: Vec<String> = self.current.borrow().iter().map(identity_of).collect();
        for entry in self.options.clone() {
            for root in stamp_template(doc, template, self.element) {
                let mut input = None;
                for field in bound_fields(doc, root) {
                    let Some(key) = doc.attr(field, BIND_ATTR) else {
                        continue;
                    };
                    doc.remove_attr(field, BIND_ATTR);
                    if Self::is_check_input(doc, field) {
                        doc.set_checked(field, chosen.contains(&identity_of(&entry)));
                        doc.set_attr(field, "name", group);
                        input = Some(field);
                    } else {
                        doc.set_text_content(field, &entry_field(&entry, &key));
                    }
                }
                let Some(input) = input else {
                    debug!("stamped check row has no checkbox input, skipping wiring");
                    continue;
                };

                let link = self.link.clone();
                let current = self.current.clone();
                let doc2 = doc.clone();
                let entry = entry.clone();
                self.subscriptions
                    .hold(doc.on(input, EventKind::Change, move |ev| {
                        let checked = doc2.checked(ev.target);
                        {
                            let mut current = current.borrow_mut();
                            if !checked {
                                let id = identity_of(&entry);
                                current.retain(|e| identity_of(e) != id);
                            } else if accumulate {
                                current.push(entry.clone());
                            } else {
                                *current = vec![entry.clone()];
                            }
                        }
                        Self::write_back(&link, &current);
                    }));
            }
        }
    }
}

impl Handler for CheckHandler {
    fn render(&mut self, doc: &Document, value: Option<&Value>, data: &DataModel) {
        if let Some(Value::Array(items)) = value {
            self.options = items.clone();
        }
        *self.current.borrow_mut() = match data.get(SELECTION_KEY) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };

        if self.current.borrow().is_empty() {
            doc.add_class(self.element, NOT_SET_CLASS);
        } else {
            doc.remove_class(self.element, NOT_SET_CLASS);
        }

        let Some(template) = self.row_template(doc) else {
            debug!("check-options container has no sibling template, skipping render");
            return;
        };
        let accumulate = data.get(CHECKBOX_FLAG_KEY) == Some(&Value::Bool(true));
        let group = data
            .get(GROUP_NAME_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        self.stamp_rows(doc, template, accumulate, &group);
    }

    fn destroy(&mut self, _doc: &Document) {
        self.subscriptions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::Binder;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// wrapper > (template > label > (input[type=?][bind=value],
    /// span[bind=label]), div.check-options[bind=options])
    fn check_fixture(doc: &Document, input_type: &str) -> NodeId {
        let wrapper = doc.create_element("div");
        doc.append_child(doc.root(), wrapper);

        let template = doc.create_element("template");
        doc.append_child(wrapper, template);
        let row = doc.create_element("label");
        doc.append_child(template, row);
        let input = doc.create_element("input");
        doc.set_attr(input, "type", input_type);
        doc.set_attr(input, BIND_ATTR, SELECTION_KEY);
        doc.append_child(row, input);
        let text = doc.create_element("span");
        doc.set_attr(text, BIND_ATTR, "label");
        doc.append_child(row, text);

        let field = doc.create_element("div");
        doc.add_class(field, CHECK_OPTIONS_CLASS);
        doc.set_attr(field, BIND_ATTR, "options");
        doc.append_child(wrapper, field);
        field
    }

    fn stamped_inputs(doc: &Document, field: NodeId) -> Vec<NodeId> {
        doc.descendants_matching(field, |d, n| d.tag(n).as_deref() == Some("input"))
    }

    fn options_data(is_checkbox: bool) -> DataModel {
        DataModel::from_value(json!({
            "options": [{"id": 1, "label": "Red"}, {"id": 2, "label": "Blue"}],
            "value": [],
            "isCheckbox": is_checkbox,
            "label": "colors",
        }))
    }

    #[test]
    fn claims_check_options_containers() {
        let doc = Document::new();
        let field = check_fixture(&doc, "checkbox");
        assert!((spec().matches)(&doc, field));
        let plain = doc.create_element("div");
        assert!(!(spec().matches)(&doc, plain));
    }

    #[test]
    fn stamps_a_named_row_per_option() {
        let doc = Document::new();
        let field = check_fixture(&doc, "checkbox");
        let binder = Binder::new(&doc, doc.root(), options_data(true));
        binder.bind();

        let inputs = stamped_inputs(&doc, field);
        assert_eq!(inputs.len(), 2);
        for input in &inputs {
            assert_eq!(doc.attr(*input, "name").as_deref(), Some("colors"));
            assert!(!doc.checked(*input));
        }
        assert_eq!(doc.text_content(field), "RedBlue");
        assert!(doc.has_class(field, NOT_SET_CLASS));
    }

    #[test]
    fn checkbox_mode_accumulates_selection() {
        let doc = Document::new();
        let field = check_fixture(&doc, "checkbox");
        let binder = Binder::new(&doc, doc.root(), options_data(true));
        binder.bind();

        let inputs = stamped_inputs(&doc, field);
        doc.set_checked(inputs[0], true);
        doc.dispatch(inputs[0], EventKind::Change);
        doc.set_checked(inputs[1], true);
        doc.dispatch(inputs[1], EventKind::Change);

        assert_eq!(
            binder.get_data().get(SELECTION_KEY),
            Some(&json!([{"id": 1, "label": "Red"}, {"id": 2, "label": "Blue"}]))
        );
        // No restamp mid-interaction: the same inputs are still live.
        assert_eq!(stamped_inputs(&doc, field), inputs);

        doc.set_checked(inputs[0], false);
        doc.dispatch(inputs[0], EventKind::Change);
        assert_eq!(
            binder.get_data().get(SELECTION_KEY),
            Some(&json!([{"id": 2, "label": "Blue"}]))
        );
    }

    #[test]
    fn radio_mode_replaces_selection() {
        let doc = Document::new();
        let field = check_fixture(&doc, "radio");
        let binder = Binder::new(&doc, doc.root(), options_data(false));
        binder.bind();

        let inputs = stamped_inputs(&doc, field);
        doc.set_checked(inputs[0], true);
        doc.dispatch(inputs[0], EventKind::Change);
        doc.set_checked(inputs[1], true);
        doc.dispatch(inputs[1], EventKind::Change);

        assert_eq!(
            binder.get_data().get(SELECTION_KEY),
            Some(&json!([{"id": 2, "label": "Blue"}]))
        );
    }

    #[test]
    fn restamp_reflects_committed_selection() {
        let doc = Document::new();
        let field = check_fixture(&doc, "checkbox");
        let binder = Binder::new(&doc, doc.root(), options_data(true));
        binder.bind();

        let inputs = stamped_inputs(&doc, field);
        doc.set_checked(inputs[0], true);
        doc.dispatch(inputs[0], EventKind::Change);

        // An external render restamps with the committed checked state.
        binder.render();
        let inputs = stamped_inputs(&doc, field);
        assert!(doc.checked(inputs[0]));
        assert!(!doc.checked(inputs[1]));
        assert!(!doc.has_class(field, NOT_SET_CLASS));
    }
}
