#![forbid(unsafe_code)]

//! The handler capability contract.
//!
//! Specialized bound-field types plug into the binder through a registry of
//! [`HandlerSpec`] entries (a side-effect-free match predicate plus a
//! factory) evaluated in registration order; the first matching spec claims
//! the element. The binder never learns a handler's internals: once built,
//! a handler only receives [`render`](Handler::render) calls and a final
//! [`destroy`](Handler::destroy).
//!
//! Handlers interact with the data model exclusively through the
//! [`BinderLink`] passed at construction: a weak back-reference whose writes
//! go through the binder's normal update protocol. A handler never owns the
//! data model.

use serde_json::Value;
use weft_dom::{Document, NodeId};

use crate::binder::BinderLink;
use crate::data::DataModel;

/// A bound-field capability claiming one element.
pub trait Handler {
    /// Project the data model value for the bound key onto the owned
    /// element(s). Must not mutate the data model; write-back happens from
    /// user-interaction listeners instead.
    fn render(&mut self, doc: &Document, value: Option<&Value>, data: &DataModel);

    /// Release owned listeners and rendered state. Called once when the
    /// binder is destroyed.
    fn destroy(&mut self, doc: &Document) {
        let _ = doc;
    }
}

/// Everything a handler factory needs to wire itself up.
pub struct HandlerContext<'a> {
    /// The document the element lives in.
    pub doc: &'a Document,
    /// The claimed element.
    pub element: NodeId,
    /// The data key the element was bound to.
    pub key: String,
    /// Weak write-back channel into the owning binder.
    pub link: BinderLink,
}

/// Match predicate: must be fast and side-effect-free. It runs once per
/// scanned element, in registry order.
pub type MatchFn = fn(&Document, NodeId) -> bool;

/// Handler factory invoked when the match predicate claims an element.
pub type BuildFn = fn(HandlerContext<'_>) -> Box<dyn Handler>;

/// A registry entry: predicate + factory. Registration order is priority
/// order; the first match wins.
#[derive(Clone, Copy)]
pub struct HandlerSpec {
    /// Short name for diagnostics.
    pub name: &'static str,
    /// Claim predicate.
    pub matches: MatchFn,
    /// Factory for claimed elements.
    pub build: BuildFn,
}

impl std::fmt::Debug for HandlerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSpec").field("name", &self.name).finish()
    }
}
