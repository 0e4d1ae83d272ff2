#![forbid(unsafe_code)]

//! Lightweight document tree for weft.
//!
//! This crate provides the host substrate the binding engine operates on:
//!
//! - [`Document`]: a cloneable, single-threaded handle to a node arena with
//!   attributes, class lists, form-control values, and a document title.
//! - an event hub with per-node and delegated listeners, handed out as
//!   RAII [`Subscription`] guards.
//! - [`SubscriptionSet`]: an arena of subscriptions for a logical scope,
//!   released together on drop.
//! - [`editable`]: a double-click-to-edit affordance used by select-style
//!   widgets.
//!
//! The tree is deliberately small: it models exactly the element surface the
//! binder and evaluator consume (attribute get/set/remove, class toggling,
//! value/text assignment, subtree queries in document order, subtree cloning
//! for template stamping) and nothing else.

pub mod document;
pub mod editable;
pub mod events;
pub mod node;

pub use document::Document;
pub use events::{Event, EventKind, Subscription, SubscriptionSet};
pub use node::NodeId;
