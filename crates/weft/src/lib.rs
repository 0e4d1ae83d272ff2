#![forbid(unsafe_code)]

//! Weft public facade.
//!
//! Re-exports the member crates and offers a [`prelude`] with the handful
//! of names a typical component needs: a [`Document`](weft_dom::Document),
//! a [`Binder`](weft_bind::Binder) over its container, the conditional
//! marker pass from [`weft_eval`], and a [`Router`](weft_router::Router)
//! to mount it.
//!
//! ```
//! use serde_json::json;
//! use weft::prelude::*;
//!
//! let doc = Document::new();
//! let field = doc.create_element("input");
//! doc.set_attr(field, BIND_ATTR, "name");
//! doc.append_child(doc.root(), field);
//!
//! let binder = Binder::new(&doc, doc.root(), DataModel::from_value(json!({"name": "Ada"})));
//! binder.bind();
//! assert_eq!(doc.value(field).as_deref(), Some("Ada"));
//! ```

pub use weft_bind as bind;
pub use weft_dom as dom;
pub use weft_eval as eval;
pub use weft_router as router;

/// The names a typical weft component uses.
pub mod prelude {
    pub use weft_bind::{
        BIND_ATTR, Binder, BinderLink, DataModel, Handler, HandlerContext, HandlerSpec,
        UpdateError, UpdateOutcome, is_not_set,
    };
    pub use weft_dom::{Document, Event, EventKind, NodeId, Subscription, SubscriptionSet};
    pub use weft_eval::{evaluate_conditions, evaluate_conditions_within, evaluate_expression};
    pub use weft_router::{ComponentRegistry, MountContext, RouteTable, Router};
}
