#![forbid(unsafe_code)]

//! Select handler: claims containers holding a `template#select-option`.
//!
//! The bound key carries the option list; the current selection lives under
//! the shared [`SELECTION_KEY`](super::SELECTION_KEY). Rendering keeps the
//! "chosen" and "still available" subsets disjoint: chosen entries appear in
//! the sibling `#selected` display, the remaining options are stamped from
//! the template as clickable rows.
//!
//! Multi mode is driven by the data model's `multi` flag and a document-wide
//! `#multi` item template; it keeps the editing surface open across choices,
//! and each chosen item carries a remove control that filters the selection
//! by identity. Single mode closes the editing surface after a choice.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;
use weft_dom::editable::stop_editing;
use weft_dom::{Document, EventKind, NodeId, SubscriptionSet};

use crate::binder::{BIND_ATTR, BinderLink};
use crate::data::DataModel;
use crate::handler::{Handler, HandlerContext, HandlerSpec};
use crate::render::NOT_SET_CLASS;

use super::{SELECTION_KEY, bound_fields, closest_with_class, entry_field, identity_of, label_of, stamp_template};

const OPTION_TEMPLATE_ID: &str = "select-option";
const MULTI_TEMPLATE_ID: &str = "multi";
const SELECTED_DISPLAY_ID: &str = "selected";
const OPTION_CLASS: &str = "option";
const REMOVE_CLASS: &str = "remove";
const SELECTED_WRAPPER_CLASS: &str = "selected-wrapper";

pub(crate) fn spec() -> HandlerSpec {
    HandlerSpec {
        name: "select",
        matches: |doc, el| option_template(doc, el).is_some(),
        build: |ctx| Box::new(SelectHandler::new(ctx)),
    }
}

fn option_template(doc: &Document, el: NodeId) -> Option<NodeId> {
    doc.find_descendant(el, |d, n| {
        d.tag(n).as_deref() == Some("template")
            && d.attr(n, "id").as_deref() == Some(OPTION_TEMPLATE_ID)
    })
}

/// Single- and multi-select widget over a template-stamped option list.
pub struct SelectHandler {
    element: NodeId,
    link: BinderLink,
    options: Vec<Value>,
    current: Rc<RefCell<Vec<Value>>>,
    subscriptions: SubscriptionSet,
}

impl SelectHandler {
    pub(crate) fn new(ctx: HandlerContext<'_>) -> Self {
        Self {
            element: ctx.element,
            link: ctx.link,
            options: Vec::new(),
            current: Rc::new(RefCell::new(Vec::new())),
            subscriptions: SubscriptionSet::new(),
        }
    }

    fn selected_display(&self, doc: &Document) -> Option<NodeId> {
        let parent = doc.parent(self.element)?;
        doc.find_descendant(parent, |d, n| {
            d.attr(n, "id").as_deref() == Some(SELECTED_DISPLAY_ID)
        })
    }

    fn write_back(link: &BinderLink, current: &Rc<RefCell<Vec<Value>>>) {
        let selection = current.borrow().clone();
        let _ = link.update_key(SELECTION_KEY, Value::Array(selection), true);
    }

    fn stamp_chosen_multi(&mut self, doc: &Document, display: NodeId, multi_template: NodeId) {
        let chosen = self.current.borrow().clone();
        for entry in chosen {
            for root in stamp_template(doc, multi_template, display) {
                if let Some(value_field) = doc.find_descendant(root, |d, n| {
                    d.attr(n, BIND_ATTR).as_deref() == Some(SELECTION_KEY)
                }) {
                    doc.remove_attr(value_field, BIND_ATTR);
                    doc.set_text_content(value_field, &label_of(&entry));
                }
                let remove =
                    doc.find_descendant(root, |d, n| d.has_class(n, REMOVE_CLASS));
                if let Some(remove) = remove {
                    let link = self.link.clone();
                    let current = self.current.clone();
                    let doc2 = doc.clone();
                    let id = identity_of(&entry);
                    self.subscriptions
                        .hold(doc.on(remove, EventKind::Click, move |ev| {
                            if let Some(wrapper) =
                                closest_with_class(&doc2, ev.target, SELECTED_WRAPPER_CLASS)
                            {
                                doc2.detach(wrapper);
                            }
                            current.borrow_mut().retain(|e| identity_of(e) != id);
                            Self::write_back(&link, &current);
                        }));
                }
            }
        }
    }

    fn stamp_available(&mut self, doc: &Document, template: NodeId, multi: bool) {
        let chosen_labels: Vec<String> = self.current.borrow().iter().map(label_of).collect();
        let available: Vec<Value> = self
            .options
            .iter()
            .filter(|entry| !chosen_labels.contains(&label_of(entry)))
            .cloned()
            .collect();

        for entry in available {
            for root in stamp_template(doc, template, self.element) {
                for field in bound_fields(doc, root) {
                    let Some(key) = doc.attr(field, BIND_ATTR) else {
                        continue;
                    };
                    doc.remove_attr(field, BIND_ATTR);
                    doc.set_text_content(field, &entry_field(&entry, &key));
                }
                let clickable = if doc.has_class(root, OPTION_CLASS) {
                    Some(root)
                } else {
                    doc.find_descendant(root, |d, n| d.has_class(n, OPTION_CLASS))
                };
                let Some(clickable) = clickable else {
                    debug!("stamped select option has no clickable row, skipping wiring");
                    continue;
                };

                let link = self.link.clone();
                let current = self.current.clone();
                let doc2 = doc.clone();
                let entry = entry.clone();
                self.subscriptions
                    .hold(doc.on(clickable, EventKind::Click, move |ev| {
                        if multi {
                            current.borrow_mut().push(entry.clone());
                            doc2.detach(ev.target);
                        } else {
                            *current.borrow_mut() = vec![entry.clone()];
                            stop_editing(&doc2);
                        }
                        Self::write_back(&link, &current);
                    }));
            }
        }
    }
}

impl Handler for SelectHandler {
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

        let Some(template) = option_template(doc, self.element) else {
            debug!("select container lost its option template, skipping render");
            return;
        };
        let multi = data.get("multi") == Some(&Value::Bool(true));
        let multi_template = multi
            .then(|| doc.element_by_id(MULTI_TEMPLATE_ID))
            .flatten();

        // Previous stamped rows and their listeners go away wholesale; the
        // chosen/available split is recomputed from scratch each render.
        self.subscriptions.clear();
        let display = self.selected_display(doc);
        if let Some(display) = display {
            doc.clear_children(display);
            doc.set_text_content(display, "");
        }
        for stale in doc.descendants_matching(self.element, |d, n| d.has_class(n, OPTION_CLASS)) {
            doc.detach(stale);
        }

        if let Some(display) = display {
            match multi_template {
                Some(multi_template) => self.stamp_chosen_multi(doc, display, multi_template),
                None => {
                    if let Some(first) = self.current.borrow().first() {
                        doc.set_text_content(display, &label_of(first));
                    }
                }
            }
        }
        self.stamp_available(doc, template, multi_template.is_some());
    }

    fn destroy(&mut self, _doc: &Document) {
        self.subscriptions.clear();
    }
}
