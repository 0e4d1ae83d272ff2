#![forbid(unsafe_code)]

//! The router: delegated navigation clicks, component mounting, title and
//! history management.
//!
//! # Invariants
//!
//! 1. `init()` is idempotent: the delegated click listener and the initial
//!    navigation are installed exactly once per router.
//! 2. Navigating to the current page is a no-op (no remount, no history
//!    entry).
//! 3. Back/forward-driven navigations replace the history entry under the
//!    cursor; fresh navigations push (dropping forward entries).
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Path matches nothing and no not-found route exists | Warn, outlet cleared, title untouched |
//! | Route names an unregistered component | Warn, outlet left empty |
//! | No element carries the outlet id | Components mount under the document root |

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde_json::Value;
use tracing::{debug, warn};
use weft_dom::{Document, EventKind, NodeId, SubscriptionSet};

use crate::history::History;
use crate::registry::ComponentRegistry;
use crate::routes::{RouteTable, normalize_path};

/// Attribute turning any element into a navigation trigger.
pub const NAVIGATE_ATTR: &str = "navigate";

/// Id of the element components are mounted under.
pub const OUTLET_ID: &str = "root";

/// Everything a mounted component receives.
pub struct MountContext {
    /// The document to build into.
    pub doc: Document,
    /// The outlet element; already cleared.
    pub outlet: NodeId,
    /// Trailing wildcard parameter captured from the path.
    pub param: Option<String>,
    /// Caller-supplied navigation data.
    pub data: Option<Value>,
}

struct RouterShared {
    doc: Document,
    table: RouteTable,
    registry: ComponentRegistry,
    history: RefCell<History>,
    current: RefCell<Option<String>>,
    fallback_title: RefCell<String>,
    outlet: Cell<Option<NodeId>>,
    initialized: Cell<bool>,
    subscriptions: RefCell<SubscriptionSet>,
}

/// Path-based router over one document. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Router {
    shared: Rc<RouterShared>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("current", &self.shared.current.borrow())
            .field("initialized", &self.shared.initialized.get())
            .finish()
    }
}

impl Router {
    #[must_use]
    pub fn new(doc: &Document, table: RouteTable, registry: ComponentRegistry) -> Self {
        Self {
            shared: Rc::new(RouterShared {
                doc: doc.clone(),
                table,
                registry,
                history: RefCell::new(History::new()),
                current: RefCell::new(None),
                fallback_title: RefCell::new(String::new()),
                outlet: Cell::new(None),
                initialized: Cell::new(false),
                subscriptions: RefCell::new(SubscriptionSet::new()),
            }),
        }
    }

    /// Currently rendered page path, once a navigation happened.
    #[must_use]
    pub fn current_page(&self) -> Option<String> {
        self.shared.current.borrow().clone()
    }

    /// Install the delegated click listener, resolve the outlet, remember
    /// the fallback title, and navigate to the history's current path.
    /// Calling `init` again is a no-op.
    pub fn init(&self) {
        if self.shared.initialized.replace(true) {
            debug!("router already initialized, ignoring init()");
            return;
        }

        let doc = &self.shared.doc;
        self.shared
            .outlet
            .set(Some(doc.element_by_id(OUTLET_ID).unwrap_or_else(|| {
                warn!(id = OUTLET_ID, "no outlet element, mounting under the document root");
                doc.root()
            })));
        *self.shared.fallback_title.borrow_mut() = doc.title();

        let weak = Rc::downgrade(&self.shared);
        let sub = doc.on_any(EventKind::Click, move |ev| {
            Self::handle_click(&weak, ev.target);
        });
        self.shared.subscriptions.borrow_mut().hold(sub);

        let start = self.shared.history.borrow().current().to_owned();
        self.navigate(&start, None, true);
    }

    fn handle_click(weak: &Weak<RouterShared>, target: NodeId) {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let router = Router { shared };
        let doc = &router.shared.doc;
        if let Some(trigger) = doc.closest_with_attr(target, NAVIGATE_ATTR)
            && let Some(path) = doc.attr(trigger, NAVIGATE_ATTR)
        {
            router.navigate(&path, None, false);
        }
    }

    /// Navigate to `path`. `data` is handed to the mounted component;
    /// `back_pressed` marks a history-driven navigation (replace instead of
    /// push). Navigating to the current page is a no-op.
    pub fn navigate(&self, path: &str, data: Option<Value>, back_pressed: bool) {
        let path = normalize_path(path);
        if self.shared.current.borrow().as_deref() == Some(path.as_str()) {
            debug!(path, "current page requested, skipping duplicate render");
            return;
        }
        *self.shared.current.borrow_mut() = Some(path.clone());

        self.render(&path, data);

        let mut history = self.shared.history.borrow_mut();
        if back_pressed {
            history.replace(path);
        } else {
            history.push(path);
        }
    }

    /// Step the session history back and render the previous page.
    pub fn back(&self) {
        let previous = self.shared.history.borrow_mut().back().map(str::to_owned);
        if let Some(previous) = previous {
            self.navigate(&previous, None, true);
        }
    }

    fn render(&self, path: &str, data: Option<Value>) {
        let doc = &self.shared.doc;
        let outlet = self.shared.outlet.get().unwrap_or_else(|| doc.root());
        doc.clear_children(outlet);

        let Some(matched) = self.shared.table.match_route(path) else {
            warn!(path, "no route matched and no not-found route is registered");
            return;
        };

        let title = match &matched.entry.title {
            Some(template) => template.replace("{}", matched.param.as_deref().unwrap_or("")),
            None => self.shared.fallback_title.borrow().clone(),
        };
        doc.set_title(&title);

        self.shared.registry.mount(
            &matched.entry.component,
            &MountContext {
                doc: doc.clone(),
                outlet,
                param: matched.param.clone(),
                data,
            },
        );
    }
}
