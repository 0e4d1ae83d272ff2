#![forbid(unsafe_code)]

//! Two-way data binding for weft document trees.
//!
//! A [`Binder`] owns a [`DataModel`] and a container element. One `bind()`
//! call scans the container for `bind`-marked elements, dispatches each to
//! the first matching [`Handler`] capability (date fields, selects, checkbox
//! groups by default) or to the generic two-way rule, and renders the
//! initial state. From then on the data model and the bound targets stay
//! mutually synchronized: element interactions flow through
//! [`update_data`](Binder::update_data), which commits atomically or rolls
//! back when the registered update listener fails.
//!
//! ```
//! use serde_json::json;
//! use weft_bind::{Binder, DataModel};
//! use weft_dom::Document;
//!
//! let doc = Document::new();
//! let input = doc.create_element("input");
//! doc.set_attr(input, weft_bind::BIND_ATTR, "name");
//! doc.append_child(doc.root(), input);
//!
//! let binder = Binder::new(&doc, doc.root(), DataModel::from_value(json!({"name": "Ada"})));
//! binder.bind();
//! assert_eq!(doc.value(input).as_deref(), Some("Ada"));
//! ```

pub mod binder;
pub mod data;
pub mod handler;
pub mod handlers;
mod render;

pub use binder::{BIND_ATTR, Binder, BinderLink, UpdateError, UpdateListener, UpdateOutcome};
pub use data::{DataModel, DataRecord, is_not_set};
pub use handler::{BuildFn, Handler, HandlerContext, HandlerSpec, MatchFn};
pub use handlers::SELECTION_KEY;
pub use render::NOT_SET_CLASS;
