#![forbid(unsafe_code)]

//! Date-field handler: claims `input[type=date]` elements.
//!
//! On blur the raw field value is coerced to an ISO `YYYY-MM-DD` string and
//! written back under the bound key; unparseable input is written back raw
//! so the update listener can decide what to do with it.

use serde_json::Value;
use weft_dom::{Document, EventKind, NodeId, Subscription};

use crate::data::{DataModel, is_not_set};
use crate::handler::{Handler, HandlerContext, HandlerSpec};
use crate::render::{NOT_SET_CLASS, date_display};

pub(crate) fn spec() -> HandlerSpec {
    HandlerSpec {
        name: "date",
        matches: |doc, el| doc.attr(el, "type").as_deref() == Some("date"),
        build: |ctx| Box::new(DateHandler::new(ctx)),
    }
}

/// Two-way binding for a date-typed input.
pub struct DateHandler {
    element: NodeId,
    _listener: Subscription,
}

impl DateHandler {
    pub(crate) fn new(ctx: HandlerContext<'_>) -> Self {
        let link = ctx.link;
        let key = ctx.key;
        let doc = ctx.doc.clone();
        let listener = ctx.doc.on(ctx.element, EventKind::Blur, move |ev| {
            let raw = doc.value(ev.target).unwrap_or_default();
            let value = Value::String(date_display(&Value::String(raw)));
            let _ = link.update_key(key.clone(), value, true);
        });
        Self {
            element: ctx.element,
            _listener: listener,
        }
    }
}

impl Handler for DateHandler {
    fn render(&mut self, doc: &Document, value: Option<&Value>, _data: &DataModel) {
        if is_not_set(value) {
            doc.add_class(self.element, NOT_SET_CLASS);
        } else {
            doc.remove_class(self.element, NOT_SET_CLASS);
        }
        let display = match value {
            None | Some(Value::Null) => String::new(),
            Some(v) => date_display(v),
        };
        doc.set_value(self.element, &display);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{BIND_ATTR, Binder};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn date_input(doc: &Document) -> NodeId {
        let input = doc.create_element("input");
        doc.set_attr(input, "type", "date");
        doc.set_attr(input, BIND_ATTR, "due");
        doc.append_child(doc.root(), input);
        input
    }

    #[test]
    fn claims_date_typed_inputs_only() {
        let doc = Document::new();
        let date = doc.create_element("input");
        doc.set_attr(date, "type", "date");
        let text = doc.create_element("input");
        assert!((spec().matches)(&doc, date));
        assert!(!(spec().matches)(&doc, text));
    }

    #[test]
    fn renders_coerced_value_and_not_set_state() {
        let doc = Document::new();
        let input = date_input(&doc);
        let binder = Binder::new(
            &doc,
            doc.root(),
            DataModel::from_value(json!({"due": "2026-03-01T10:30:00Z"})),
        );
        binder.bind();

        assert_eq!(doc.value(input).as_deref(), Some("2026-03-01"));
        assert!(!doc.has_class(input, NOT_SET_CLASS));

        binder.update_key("due", Value::Null, true);
        assert_eq!(doc.value(input).as_deref(), Some(""));
        assert!(doc.has_class(input, NOT_SET_CLASS));
    }

    #[test]
    fn blur_writes_iso_date_back() {
        let doc = Document::new();
        let input = date_input(&doc);
        let binder = Binder::new(&doc, doc.root(), DataModel::new());
        binder.bind();

        doc.set_value(input, "2026-12-24");
        doc.dispatch(input, EventKind::Blur);
        assert_eq!(binder.get_data().get("due"), Some(&json!("2026-12-24")));
    }
}
