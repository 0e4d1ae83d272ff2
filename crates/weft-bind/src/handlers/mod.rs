#![forbid(unsafe_code)]

//! Built-in handler variants: date fields, single/multi selects, and
//! checkbox groups.
//!
//! Each variant keeps a local current-selection cache distinct from the data
//! model: the rendered split between "chosen" and "still available" options
//! is a derived projection, never the source of truth. Every interaction
//! writes back through the owning binder's update protocol via
//! [`BinderLink`](crate::binder::BinderLink).
//!
//! Selection-style variants read and write the shared [`SELECTION_KEY`] of
//! the data model regardless of which key their container was bound to; the
//! bound key carries the option list.

mod check;
mod date;
mod select;

pub use check::CheckHandler;
pub use date::DateHandler;
pub use select::SelectHandler;

use serde_json::Value;
use weft_dom::{Document, NodeId};

use crate::binder::BIND_ATTR;
use crate::handler::HandlerSpec;
use crate::render::value_display;

/// Data-model key carrying the current selection of select-style variants.
pub const SELECTION_KEY: &str = "value";

/// The default registry, in claim-priority order.
pub(crate) fn default_registry() -> Vec<HandlerSpec> {
    vec![date::spec(), select::spec(), check::spec()]
}

/// Identity of an option entry, used when filtering a removed entry out of a
/// selection. Objects identify by `id`, falling back to `label`; scalar
/// entries identify by their display text.
pub(crate) fn identity_of(entry: &Value) -> String {
    match entry {
        Value::Object(map) => map
            .get("id")
            .or_else(|| map.get("label"))
            .map(value_display)
            .unwrap_or_else(|| value_display(entry)),
        other => value_display(other),
    }
}

/// Display label of an option entry.
pub(crate) fn label_of(entry: &Value) -> String {
    value_display(entry)
}

/// Field of an option entry as display text; scalar entries display
/// themselves whatever the field asked for.
pub(crate) fn entry_field(entry: &Value, key: &str) -> String {
    match entry {
        Value::Object(map) => map.get(key).map(value_display).unwrap_or_default(),
        other => value_display(other),
    }
}

/// Stamp a template's content under `target`: each template child is
/// deep-cloned (live, listener-free) and appended. Returns the stamped
/// roots in order.
pub(crate) fn stamp_template(doc: &Document, template: NodeId, target: NodeId) -> Vec<NodeId> {
    doc.children(template)
        .into_iter()
        .map(|child| {
            let copy = doc.clone_subtree(child);
            doc.append_child(target, copy);
            copy
        })
        .collect()
}

/// The stamped root plus its descendants that carry a binding marker.
pub(crate) fn bound_fields(doc: &Document, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    if doc.has_attr(root, BIND_ATTR) {
        out.push(root);
    }
    out.extend(doc.descendants_with_attr(root, BIND_ATTR));
    out
}

/// Nearest self-or-ancestor carrying a class.
pub(crate) fn closest_with_class(doc: &Document, node: NodeId, class: &str) -> Option<NodeId> {
    let mut cur = Some(node);
    while let Some(id) = cur {
        if doc.has_class(id, class) {
            return Some(id);
        }
        cur = doc.parent(id);
    }
    None
}
