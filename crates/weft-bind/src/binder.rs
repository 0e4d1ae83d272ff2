#![forbid(unsafe_code)]

//! Two-way binding between a [`DataModel`] and document-tree elements.
//!
//! A [`Binder`] scans its container once for elements carrying the `bind`
//! marker, wires each to the matching handler capability or to the generic
//! blur-driven listener, and keeps the data model and every bound target
//! mutually synchronized from then on.
//!
//! # Invariants
//!
//! 1. A binding marker is consumed exactly once during [`bind`](Binder::bind);
//!    a second `bind()` call is a no-op (no duplicate listeners, no double
//!    render).
//! 2. [`render`](Binder::render) is pure with respect to the data model: it
//!    projects values onto targets and never writes back.
//! 3. [`update_data`](Binder::update_data) either commits the full merged
//!    state (after the update listener succeeds) or restores the exact
//!    pre-merge snapshot. There is no partially applied state.
//! 4. At most one update is in flight per binder; re-entrant calls from
//!    inside the update listener are rejected, never interleaved.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Update listener fails | Data model rolled back, outcome reports the error |
//! | Update with no changed keys | Silent no-op, listener not invoked |
//! | Re-entrant `update_data` | Rejected with a warning, committed state untouched |
//! | Write-back after the binder was dropped | `BinderLink` calls return `None` |

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde_json::Value;
use tracing::{debug, warn};
use weft_dom::{Document, EventKind, NodeId, SubscriptionSet};

use crate::data::{DataModel, is_not_set};
use crate::handler::{Handler, HandlerContext, HandlerSpec};
use crate::handlers;
use crate::render::{read_element_value, render_primitive};

/// The binding marker attribute, consumed during `bind()`.
pub const BIND_ATTR: &str = "bind";

/// Error reported by an update listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateError {
    message: String,
}

impl UpdateError {
    /// Wrap a listener failure message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for UpdateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "update listener failed: {}", self.message)
    }
}

impl std::error::Error for UpdateError {}

/// What an [`update_data`](Binder::update_data) call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No key in the partial differed from current state; the listener was
    /// not invoked.
    Unchanged,
    /// The merged state was accepted and kept.
    Committed,
    /// The listener failed; the pre-merge state was restored.
    RolledBack(UpdateError),
    /// The call arrived while another update was in flight on this binder.
    Rejected,
}

impl UpdateOutcome {
    /// Whether the call left the merged state in place.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// External collaborator notified of every committed update.
pub type UpdateListener = Rc<dyn Fn(&DataModel) -> Result<(), UpdateError>>;

enum BoundTarget {
    /// Plain element under the generic two-way rule.
    Element(NodeId),
    /// A handler capability wrapping a more complex element.
    Capability(Box<dyn Handler>),
}

struct BinderState {
    data: DataModel,
    /// Key to targets, in scan order. Multiple targets may share one key.
    bindings: Vec<(String, Vec<BoundTarget>)>,
    registry: Vec<HandlerSpec>,
    subscriptions: SubscriptionSet,
    on_update: Option<UpdateListener>,
    bound: bool,
}

impl BinderState {
    fn push_target(&mut self, key: &str, target: BoundTarget) {
        match self.bindings.iter_mut().find(|(k, _)| k == key) {
            Some((_, targets)) => targets.push(target),
            None => self.bindings.push((key.to_owned(), vec![target])),
        }
    }
}

struct BinderShared {
    doc: Document,
    container: NodeId,
    state: RefCell<BinderState>,
    in_update: Cell<bool>,
}

/// Two-way binder over one container element.
///
/// Cheap to clone; clones share the same binder instance (handlers hold a
/// weak [`BinderLink`] back-reference for write-back).
#[derive(Clone)]
pub struct Binder {
    shared: Rc<BinderShared>,
}

impl std::fmt::Debug for Binder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("Binder")
            .field("keys", &state.bindings.len())
            .field("bound", &state.bound)
            .finish()
    }
}

impl Binder {
    /// Create a binder over `container` with initial data. The built-in
    /// handler registry (date, select, check) is installed; additional
    /// specs can be appended with [`register_handler`](Self::register_handler)
    /// before calling [`bind`](Self::bind).
    #[must_use]
    pub fn new(doc: &Document, container: NodeId, data: DataModel) -> Self {
        Self {
            shared: Rc::new(BinderShared {
                doc: doc.clone(),
                container,
                state: RefCell::new(BinderState {
                    data,
                    bindings: Vec::new(),
                    registry: handlers::default_registry(),
                    subscriptions: SubscriptionSet::new(),
                    on_update: None,
                    bound: false,
                }),
                in_update: Cell::new(false),
            }),
        }
    }

    /// The document this binder operates on.
    #[must_use]
    pub fn document(&self) -> Document {
        self.shared.doc.clone()
    }

    /// The container element this binder scans.
    #[must_use]
    pub fn container(&self) -> NodeId {
        self.shared.container
    }

    /// Append a handler spec. Registration order is priority order.
    pub fn register_handler(&self, spec: HandlerSpec) {
        self.shared.state.borrow_mut().registry.push(spec);
    }

    /// Weak write-back channel for handlers.
    #[must_use]
    pub fn link(&self) -> BinderLink {
        BinderLink {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Scan the container for `bind`-marked elements, wire each one, then
    /// perform one full render. Calling this more than once is a no-op.
    pub fn bind(&self) {
        {
            let mut state = self.shared.state.borrow_mut();
            if state.bound {
                debug!("container already bound, ignoring bind()");
                return;
            }
            state.bound = true;
        }

        let doc = &self.shared.doc;
        for el in doc.descendants_with_attr(self.shared.container, BIND_ATTR) {
            let Some(key) = doc.attr(el, BIND_ATTR) else {
                continue;
            };
            doc.remove_attr(el, BIND_ATTR);

            let claimed = {
                let state = self.shared.state.borrow();
                state
                    .registry
                    .iter()
                    .copied()
                    .find(|spec| (spec.matches)(doc, el))
            };

            match claimed {
                Some(spec) => {
                    debug!(handler = spec.name, key, "handler claimed element");
                    let handler = (spec.build)(HandlerContext {
                        doc,
                        element: el,
                        key: key.clone(),
                        link: self.link(),
                    });
                    self.shared
                        .state
                        .borrow_mut()
                        .push_target(&key, BoundTarget::Capability(handler));
                }
                None => {
                    self.attach_generic_listener(el, &key);
                    self.shared
                        .state
                        .borrow_mut()
                        .push_target(&key, BoundTarget::Element(el));
                }
            }
        }

        self.render();
    }

    /// Project the current data model onto every bound target.
    ///
    /// Side effect only: document mutation. The data model is never written.
    pub fn render(&self) {
        let doc = self.shared.doc.clone();
        let mut state = self.shared.state.borrow_mut();
        let state = &mut *state;
        for (key, targets) in state.bindings.iter_mut() {
            let value = state.data.get(key.as_str());
            for target in targets.iter_mut() {
                match target {
                    BoundTarget::Element(el) => render_primitive(&doc, *el, value),
                    BoundTarget::Capability(handler) => handler.render(&doc, value, &state.data),
                }
            }
        }
    }

    /// Replace the data model wholesale. Rendering can be skipped for
    /// targets that manage their own visual state mid-interaction.
    pub fn set_data(&self, data: DataModel, re_render: bool) {
        self.shared.state.borrow_mut().data = data;
        if re_render {
            self.render();
        }
    }

    /// Merge a partial update into the data model.
    ///
    /// Keys whose values are strictly equal to current state do not count as
    /// changes; an all-equal partial is a silent no-op. Otherwise the merge
    /// is tentative: the update listener sees the full merged model, and a
    /// listener failure restores the exact pre-merge snapshot.
    ///
    /// Composite values compare structurally (there is no object identity
    /// here), so re-setting a structurally equal array or object counts as
    /// unchanged.
    pub fn update_data(&self, partial: DataModel, re_render: bool) -> UpdateOutcome {
        if self.shared.in_update.get() {
            warn!("re-entrant update_data rejected; serialize updates per binder");
            return UpdateOutcome::Rejected;
        }

        let (listener, merged, snapshot) = {
            let mut state = self.shared.state.borrow_mut();
            let changed = partial
                .iter()
                .any(|(key, value)| state.data.get(key) != Some(value));
            if !changed {
                debug!("partial update contained no changes, ignoring");
                return UpdateOutcome::Unchanged;
            }

            let snapshot = state.data.clone();
            for (key, value) in partial.iter() {
                state.data.insert(key.clone(), value.clone());
            }
            (state.on_update.clone(), state.data.clone(), snapshot)
        };

        self.shared.in_update.set(true);
        let result = match &listener {
            Some(listener) => listener(&merged),
            None => {
                debug!(keys = merged.len(), "data updated, no update listener bound");
                Ok(())
            }
        };
        self.shared.in_update.set(false);

        match result {
            Ok(()) => {
                if re_render {
                    self.render();
                }
                UpdateOutcome::Committed
            }
            Err(err) => {
                warn!(error = %err, "update listener failed, rolling back");
                self.shared.state.borrow_mut().data = snapshot;
                UpdateOutcome::RolledBack(err)
            }
        }
    }

    /// Single-key convenience form of [`update_data`](Self::update_data).
    pub fn update_key(
        &self,
        key: impl Into<String>,
        value: Value,
        re_render: bool,
    ) -> UpdateOutcome {
        self.update_data(DataModel::from_iter([(key.into(), value)]), re_render)
    }

    /// Snapshot of the current data model.
    #[must_use]
    pub fn get_data(&self) -> DataModel {
        self.shared.state.borrow().data.clone()
    }

    /// Read the current data model without cloning it.
    pub fn with_data<R>(&self, f: impl FnOnce(&DataModel) -> R) -> R {
        f(&self.shared.state.borrow().data)
    }

    /// Replace the update-notification listener. Passing no listener is a
    /// valid state: commits are then logged and accepted.
    pub fn set_on_update(
        &self,
        listener: impl Fn(&DataModel) -> Result<(), UpdateError> + 'static,
    ) {
        self.shared.state.borrow_mut().on_update = Some(Rc::new(listener));
    }

    /// The shared emptiness predicate. See [`is_not_set`].
    #[must_use]
    pub fn is_not_set(&self, value: Option<&Value>) -> bool {
        is_not_set(value)
    }

    /// Release every target: drop all listeners, destroy handler targets,
    /// clear the binding map, the handler registry, and the update listener.
    pub fn destroy(&self) {
        let doc = self.shared.doc.clone();
        let mut state = self.shared.state.borrow_mut();
        state.subscriptions.clear();
        for (_, targets) in state.bindings.drain(..) {
            for target in targets {
                if let BoundTarget::Capability(mut handler) = target {
                    handler.destroy(&doc);
                }
            }
        }
        state.registry.clear();
        state.on_update = None;
    }

    /// Generic two-way rule: on loss of focus, write the element's value
    /// back under its key and propagate it to the other plain element
    /// targets sharing the key, without issuing a full render for them.
    /// Handler targets are deliberately skipped here: they are refreshed by
    /// the full render the committed update triggers, and pushing a raw
    /// string at them would bypass their selection caches.
    fn attach_generic_listener(&self, el: NodeId, key: &str) {
        let weak = Rc::downgrade(&self.shared);
        let key = key.to_owned();
        let sub = self.shared.doc.on(el, EventKind::Blur, move |ev| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let binder = Binder { shared };
            let doc = binder.shared.doc.clone();
            let value = Value::String(read_element_value(&doc, ev.target));

            let _ = binder.update_key(key.clone(), value.clone(), true);

            let peers: Vec<NodeId> = {
                let state = binder.shared.state.borrow();
                state
                    .bindings
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, targets)| {
                        targets
                            .iter()
                            .filter_map(|target| match target {
                                BoundTarget::Element(peer) if *peer != ev.target => Some(*peer),
                                _ => None,
                            })
                            .collect()
                    })
                    .unwrap_or_default()
            };
            for peer in peers {
                render_primitive(&doc, peer, Some(&value));
            }
        });
        self.shared.state.borrow_mut().subscriptions.hold(sub);
    }
}

/// Weak back-reference into a [`Binder`], held by handlers for write-back.
///
/// Handlers never own the data model; every interaction flows through the
/// binder's normal update protocol. All calls return `None` once the binder
/// has been dropped.
#[derive(Clone)]
pub struct BinderLink {
    shared: Weak<BinderShared>,
}

impl BinderLink {
    fn upgrade(&self) -> Option<Binder> {
        self.shared.upgrade().map(|shared| Binder { shared })
    }

    /// Write one key back through the binder's update protocol.
    pub fn update_key(&self, key: impl Into<String>, value: Value, re_render: bool) -> Option<UpdateOutcome> {
        self.upgrade()
            .map(|binder| binder.update_key(key, value, re_render))
    }

    /// Read the owning binder's data model.
    pub fn with_data<R>(&self, f: impl FnOnce(&DataModel) -> R) -> Option<R> {
        self.upgrade().map(|binder| binder.with_data(f))
    }
}

impl std::fmt::Debug for BinderLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinderLink")
            .field("attached", &(self.shared.strong_count() > 0))
            .finish()
    }
}
