#![forbid(unsafe_code)]

//! Event listeners with RAII lifetimes.
//!
//! Listeners are stored as `Weak` callbacks inside the document's event hub;
//! the returned [`Subscription`] holds the only strong reference. Dropping a
//! subscription therefore detaches the listener before the next dispatch
//! cycle, and dead entries are pruned lazily during dispatch.
//!
//! # Invariants
//!
//! 1. Listeners for one `(node, kind)` pair fire in registration order.
//! 2. Delegated listeners fire after targeted listeners, in registration
//!    order, for every event of their kind.
//! 3. Dropping a [`Subscription`] detaches its callback before the next
//!    dispatch cycle.
//! 4. Dispatch collects callbacks before invoking any of them, so a callback
//!    may freely mutate the tree or add/drop subscriptions.

use std::rc::{Rc, Weak};

use ahash::AHashMap;

use crate::node::NodeId;

/// The event kinds the binding engine reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Loss of focus on a form control or editable element.
    Blur,
    /// Checkbox/radio state change.
    Change,
    /// Pointer click.
    Click,
    /// Pointer double click.
    DblClick,
}

/// A dispatched event.
#[derive(Clone, Copy, Debug)]
pub struct Event {
    /// The node the event was dispatched on.
    pub target: NodeId,
    /// What happened.
    pub kind: EventKind,
}

pub(crate) type Callback = dyn Fn(&Event);

/// RAII guard for a registered listener.
///
/// The listener stays attached for as long as the subscription is alive.
#[must_use = "dropping a Subscription detaches the listener"]
pub struct Subscription {
    _cb: Rc<Callback>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish()
    }
}

/// Collects subscriptions for a logical scope (a binder, a handler, a
/// router). Dropping the set, or calling [`clear`](Self::clear), releases
/// every held subscription at once.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    subs: Vec<Subscription>,
}

impl SubscriptionSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `sub` alive until the set is dropped or cleared.
    pub fn hold(&mut self, sub: Subscription) {
        self.subs.push(sub);
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subs.len()
    }

    /// Whether the set holds no subscriptions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Release every subscription immediately. The set stays reusable.
    pub fn clear(&mut self) {
        self.subs.clear();
    }
}

/// Listener storage for a document.
#[derive(Default)]
pub(crate) struct EventHub {
    targeted: AHashMap<NodeId, Vec<(EventKind, Weak<Callback>)>>,
    delegated: Vec<(EventKind, Weak<Callback>)>,
}

impl EventHub {
    pub(crate) fn subscribe(
        &mut self,
        node: NodeId,
        kind: EventKind,
        cb: Rc<Callback>,
    ) -> Subscription {
        self.targeted
            .entry(node)
            .or_default()
            .push((kind, Rc::downgrade(&cb)));
        Subscription { _cb: cb }
    }

    pub(crate) fn subscribe_any(&mut self, kind: EventKind, cb: Rc<Callback>) -> Subscription {
        self.delegated.push((kind, Rc::downgrade(&cb)));
        Subscription { _cb: cb }
    }

    /// Collect the live callbacks for an event, pruning dead entries.
    ///
    /// Targeted listeners come first, then delegated ones.
    pub(crate) fn collect(&mut self, node: NodeId, kind: EventKind) -> Vec<Rc<Callback>> {
        let mut out = Vec::new();
        if let Some(entries) = self.targeted.get_mut(&node) {
            entries.retain(|(_, weak)| weak.strong_count() > 0);
            for (k, weak) in entries.iter() {
                if *k == kind
                    && let Some(cb) = weak.upgrade()
                {
                    out.push(cb);
                }
            }
            if entries.is_empty() {
                self.targeted.remove(&node);
            }
        }
        self.delegated.retain(|(_, weak)| weak.strong_count() > 0);
        for (k, weak) in &self.delegated {
            if *k == kind
                && let Some(cb) = weak.upgrade()
            {
                out.push(cb);
            }
        }
        out
    }
}
