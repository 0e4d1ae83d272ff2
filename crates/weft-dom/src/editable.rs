#![forbid(unsafe_code)]

//! Double-click-to-edit affordance.
//!
//! Select-style widgets open a transient editing surface (an options list, a
//! free-text field) on double click and close it again when the interaction
//! ends. The open state is tracked with an `editing` class plus a
//! `contenteditable` attribute so stylesheets can target it.

use crate::document::Document;
use crate::events::{EventKind, Subscription};
use crate::node::NodeId;

/// Class marking an element whose editing surface is open.
pub const EDITING_CLASS: &str = "editing";

/// Arm `node` so a double click opens its editing surface and a blur closes
/// it again. The behavior stays armed while the returned subscriptions are
/// held.
pub fn make_editable(doc: &Document, node: NodeId) -> [Subscription; 2] {
    let open_doc = doc.clone();
    let open = doc.on(node, EventKind::DblClick, move |ev| {
        open_doc.add_class(ev.target, EDITING_CLASS);
        open_doc.set_attr(ev.target, "contenteditable", "true");
    });
    let close_doc = doc.clone();
    let close = doc.on(node, EventKind::Blur, move |ev| {
        close_editor(&close_doc, ev.target);
    });
    [open, close]
}

/// Close every open editing surface in the document.
pub fn stop_editing(doc: &Document) {
    let open = doc.descendants_matching(doc.root(), |d, n| d.has_class(n, EDITING_CLASS));
    if doc.has_class(doc.root(), EDITING_CLASS) {
        close_editor(doc, doc.root());
    }
    for node in open {
        close_editor(doc, node);
    }
}

fn close_editor(doc: &Document, node: NodeId) {
    doc.remove_class(node, EDITING_CLASS);
    doc.remove_attr(node, "contenteditable");
}
