#![forbid(unsafe_code)]

//! The document tree handle.
//!
//! [`Document`] is a cloneable handle over a shared node arena
//! (`Rc<RefCell<..>>`, single-threaded). Clones share the same tree, so a
//! binder, an evaluator pass, and a router can all hold the document without
//! ownership gymnastics.
//!
//! # Invariants
//!
//! 1. [`NodeId`]s are stable: detaching a node never invalidates ids.
//! 2. Subtree queries return nodes in document order (preorder DFS) and do
//!    not descend into `template` elements; template content is inert until
//!    cloned out.
//! 3. No method holds a borrow of the arena while invoking user callbacks;
//!    event dispatch collects listeners first, then calls them.
//!
//! # Failure Modes
//!
//! Operations addressing a text node where an element is required are no-ops
//! (getters return `None`/empty). Nothing in this module panics on a stale
//! or mismatched id as long as the id came from the same document.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::events::{Callback, Event, EventHub, EventKind, Subscription};
use crate::node::{Element, Node, NodeData, NodeId};

struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
    title: String,
    hub: EventHub,
}

impl Tree {
    fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id.0)?.data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.0)?.data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    /// Preorder DFS below `root` (root excluded). Children of `template`
    /// elements are skipped: template content is not part of the live tree.
    fn preorder(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[root.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            let descend = !matches!(&self.nodes[id.0].data, NodeData::Element(el) if el.tag == "template");
            if descend {
                stack.extend(self.nodes[id.0].children.iter().rev().copied());
            }
        }
        out
    }

    fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let data = self.nodes[id.0].data.clone();
        let children: Vec<NodeId> = self.nodes[id.0].children.clone();
        let new_id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        for child in children {
            let new_child = self.clone_subtree(child);
            self.nodes[new_child.0].parent = Some(new_id);
            self.nodes[new_id.0].children.push(new_child);
        }
        new_id
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element(_) => {
                for child in self.nodes[id.0].children.clone() {
                    self.collect_text(child, out);
                }
            }
        }
    }
}

/// Shared handle to a document tree. Clones alias the same tree.
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<Tree>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tree = self.inner.borrow();
        f.debug_struct("Document")
            .field("nodes", &tree.nodes.len())
            .field("title", &tree.title)
            .finish()
    }
}

impl Document {
    /// Create a document with an empty `body` root element.
    #[must_use]
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            data: NodeData::Element(Element::new("body")),
        };
        Self {
            inner: Rc::new(RefCell::new(Tree {
                nodes: vec![root],
                root: NodeId(0),
                title: String::new(),
                hub: EventHub::default(),
            })),
        }
    }

    /// The root element.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.inner.borrow().root
    }

    // ---- construction -----------------------------------------------------

    /// Create a detached element node.
    pub fn create_element(&self, tag: &str) -> NodeId {
        let mut tree = self.inner.borrow_mut();
        let id = NodeId(tree.nodes.len());
        tree.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data: NodeData::Element(Element::new(tag)),
        });
        id
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: &str) -> NodeId {
        let mut tree = self.inner.borrow_mut();
        let id = NodeId(tree.nodes.len());
        tree.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data: NodeData::Text(text.to_owned()),
        });
        id
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&self, parent: NodeId, child: NodeId) {
        let mut tree = self.inner.borrow_mut();
        tree.detach(child);
        tree.nodes[child.0].parent = Some(parent);
        tree.nodes[parent.0].children.push(child);
    }

    /// Remove `node` from its parent. The node and its subtree stay alive
    /// (ids remain valid) but leave the live tree.
    pub fn detach(&self, node: NodeId) {
        self.inner.borrow_mut().detach(node);
    }

    /// Detach every child of `node`.
    pub fn clear_children(&self, node: NodeId) {
        let children = self.children(node);
        let mut tree = self.inner.borrow_mut();
        for child in children {
            tree.detach(child);
        }
    }

    /// Deep-copy the subtree rooted at `node`. The copy is detached and
    /// carries no event listeners.
    pub fn clone_subtree(&self, node: NodeId) -> NodeId {
        self.inner.borrow_mut().clone_subtree(node)
    }

    // ---- structure --------------------------------------------------------

    /// Child ids in order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner.borrow().nodes[node.0].children.clone()
    }

    /// Parent id, if attached.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.borrow().nodes[node.0].parent
    }

    /// Whether `node` is an element (as opposed to text).
    #[must_use]
    pub fn is_element(&self, node: NodeId) -> bool {
        self.inner.borrow().element(node).is_some()
    }

    /// Lower-cased tag name of an element node.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.inner.borrow().element(node).map(|el| el.tag.clone())
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let tree = self.inner.borrow();
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = tree.nodes[id.0].parent;
        }
        false
    }

    // ---- attributes -------------------------------------------------------

    /// Attribute value, if present.
    #[must_use]
    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .element(node)
            .and_then(|el| el.attrs.get(name).cloned())
    }

    /// Whether the attribute is present (possibly empty).
    #[must_use]
    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.inner
            .borrow()
            .element(node)
            .is_some_and(|el| el.attrs.contains_key(name))
    }

    /// Set an attribute. No-op on text nodes.
    pub fn set_attr(&self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.inner.borrow_mut().element_mut(node) {
            el.attrs.insert(name.to_owned(), value.to_owned());
        }
    }

    /// Remove an attribute if present.
    pub fn remove_attr(&self, node: NodeId, name: &str) {
        if let Some(el) = self.inner.borrow_mut().element_mut(node) {
            el.attrs.remove(name);
        }
    }

    // ---- classes ----------------------------------------------------------

    /// Add a class name (idempotent).
    pub fn add_class(&self, node: NodeId, name: &str) {
        if let Some(el) = self.inner.borrow_mut().element_mut(node)
            && !el.classes.iter().any(|c| c == name)
        {
            el.classes.push(name.to_owned());
        }
    }

    /// Remove a class name if present.
    pub fn remove_class(&self, node: NodeId, name: &str) {
        if let Some(el) = self.inner.borrow_mut().element_mut(node) {
            el.classes.retain(|c| c != name);
        }
    }

    /// Whether the element carries a class name.
    #[must_use]
    pub fn has_class(&self, node: NodeId, name: &str) -> bool {
        self.inner
            .borrow()
            .element(node)
            .is_some_and(|el| el.classes.iter().any(|c| c == name))
    }

    /// The element's class names in insertion order.
    #[must_use]
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.inner
            .borrow()
            .element(node)
            .map(|el| el.classes.clone())
            .unwrap_or_default()
    }

    // ---- value / text / checked -------------------------------------------

    /// Whether the element exposes an editable value slot (form controls).
    #[must_use]
    pub fn has_value_slot(&self, node: NodeId) -> bool {
        self.inner
            .borrow()
            .element(node)
            .is_some_and(Element::has_value_slot)
    }

    /// Current value of a form control.
    #[must_use]
    pub fn value(&self, node: NodeId) -> Option<String> {
        let tree = self.inner.borrow();
        let el = tree.element(node)?;
        el.has_value_slot().then(|| el.value.clone())
    }

    /// Assign a form control's value. No-op on elements without a value slot.
    pub fn set_value(&self, node: NodeId, value: &str) {
        if let Some(el) = self.inner.borrow_mut().element_mut(node)
            && el.has_value_slot()
        {
            el.value = value.to_owned();
        }
    }

    /// Checked state of a checkbox/radio input.
    #[must_use]
    pub fn checked(&self, node: NodeId) -> bool {
        self.inner.borrow().element(node).is_some_and(|el| el.checked)
    }

    /// Set the checked state.
    pub fn set_checked(&self, node: NodeId, checked: bool) {
        if let Some(el) = self.inner.borrow_mut().element_mut(node) {
            el.checked = checked;
        }
    }

    /// Concatenated text of the subtree (the node itself for text nodes).
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let tree = self.inner.borrow();
        let mut out = String::new();
        tree.collect_text(node, &mut out);
        out
    }

    /// Replace the node's children with a single text node. For text nodes,
    /// replaces the text in place.
    pub fn set_text_content(&self, node: NodeId, text: &str) {
        {
            let mut tree = self.inner.borrow_mut();
            if let NodeData::Text(existing) = &mut tree.nodes[node.0].data {
                *existing = text.to_owned();
                return;
            }
        }
        self.clear_children(node);
        let text_node = self.create_text(text);
        self.append_child(node, text_node);
    }

    // ---- title ------------------------------------------------------------

    /// Document title.
    #[must_use]
    pub fn title(&self) -> String {
        self.inner.borrow().title.clone()
    }

    /// Replace the document title.
    pub fn set_title(&self, title: &str) {
        self.inner.borrow_mut().title = title.to_owned();
    }

    // ---- queries ----------------------------------------------------------

    /// Descendants of `root` carrying an attribute, in document order.
    /// Does not descend into `template` content.
    #[must_use]
    pub fn descendants_with_attr(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        let order = self.inner.borrow().preorder(root);
        order.into_iter().filter(|id| self.has_attr(*id, name)).collect()
    }

    /// Descendants of `root` satisfying `pred`, in document order.
    /// Does not descend into `template` content.
    #[must_use]
    pub fn descendants_matching(
        &self,
        root: NodeId,
        pred: impl Fn(&Document, NodeId) -> bool,
    ) -> Vec<NodeId> {
        let order = self.inner.borrow().preorder(root);
        order.into_iter().filter(|id| pred(self, *id)).collect()
    }

    /// First descendant (document order) satisfying `pred`. Unlike the live
    /// queries this one descends into `template` content, so callers can
    /// locate inert templates for stamping.
    #[must_use]
    pub fn find_descendant(
        &self,
        root: NodeId,
        pred: impl Fn(&Document, NodeId) -> bool,
    ) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = {
            let tree = self.inner.borrow();
            tree.nodes[root.0].children.iter().rev().copied().collect()
        };
        while let Some(id) = stack.pop() {
            if pred(self, id) {
                return Some(id);
            }
            let tree = self.inner.borrow();
            stack.extend(tree.nodes[id.0].children.iter().rev().copied());
        }
        None
    }

    /// Element with a given `id` attribute anywhere in the document,
    /// templates included.
    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let root = self.root();
        if self.attr(root, "id").as_deref() == Some(id) {
            return Some(root);
        }
        self.find_descendant(root, |doc, node| doc.attr(node, "id").as_deref() == Some(id))
    }

    /// Nearest self-or-ancestor carrying an attribute.
    #[must_use]
    pub fn closest_with_attr(&self, node: NodeId, name: &str) -> Option<NodeId> {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if self.has_attr(id, name) {
                return Some(id);
            }
            cur = self.parent(id);
        }
        None
    }

    // ---- events -----------------------------------------------------------

    /// Listen for `kind` events dispatched on `node`.
    pub fn on(
        &self,
        node: NodeId,
        kind: EventKind,
        callback: impl Fn(&Event) + 'static,
    ) -> Subscription {
        let cb: Rc<Callback> = Rc::new(callback);
        self.inner.borrow_mut().hub.subscribe(node, kind, cb)
    }

    /// Listen for every `kind` event dispatched anywhere in the document.
    pub fn on_any(&self, kind: EventKind, callback: impl Fn(&Event) + 'static) -> Subscription {
        let cb: Rc<Callback> = Rc::new(callback);
        self.inner.borrow_mut().hub.subscribe_any(kind, cb)
    }

    /// Dispatch an event on `node`. Listeners run after the arena borrow is
    /// released, so they may mutate the document freely.
    pub fn dispatch(&self, node: NodeId, kind: EventKind) {
        let callbacks = self.inner.borrow_mut().hub.collect(node, kind);
        trace!(node = node.index(), ?kind, listeners = callbacks.len(), "dispatch");
        let event = Event { target: node, kind };
        for cb in callbacks {
            cb(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SubscriptionSet;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn doc_with(tags: &[&str]) -> (Document, Vec<NodeId>) {
        let doc = Document::new();
        let ids = tags
            .iter()
            .map(|tag| {
                let id = doc.create_element(tag);
                doc.append_child(doc.root(), id);
                id
            })
            .collect();
        (doc, ids)
    }

    #[test]
    fn append_and_children_order() {
        let (doc, ids) = doc_with(&["div", "span", "input"]);
        assert_eq!(doc.children(doc.root()), ids);
        assert_eq!(doc.parent(ids[0]), Some(doc.root()));
    }

    #[test]
    fn detach_keeps_id_valid() {
        let (doc, ids) = doc_with(&["div", "span"]);
        doc.detach(ids[0]);
        assert_eq!(doc.children(doc.root()), vec![ids[1]]);
        assert_eq!(doc.parent(ids[0]), None);
        assert_eq!(doc.tag(ids[0]).as_deref(), Some("div"));
    }

    #[test]
    fn attributes_roundtrip() {
        let (doc, ids) = doc_with(&["div"]);
        doc.set_attr(ids[0], "bind", "name");
        assert_eq!(doc.attr(ids[0], "bind").as_deref(), Some("name"));
        doc.remove_attr(ids[0], "bind");
        assert!(!doc.has_attr(ids[0], "bind"));
    }

    #[test]
    fn class_list_is_ordered_and_idempotent() {
        let (doc, ids) = doc_with(&["div"]);
        doc.add_class(ids[0], "a");
        doc.add_class(ids[0], "b");
        doc.add_class(ids[0], "a");
        assert_eq!(doc.classes(ids[0]), vec!["a".to_owned(), "b".to_owned()]);
        doc.remove_class(ids[0], "a");
        assert!(!doc.has_class(ids[0], "a"));
        assert!(doc.has_class(ids[0], "b"));
    }

    #[test]
    fn value_slot_depends_on_tag() {
        let (doc, ids) = doc_with(&["input", "div"]);
        doc.set_value(ids[0], "hello");
        assert_eq!(doc.value(ids[0]).as_deref(), Some("hello"));
        doc.set_value(ids[1], "hello");
        assert_eq!(doc.value(ids[1]), None);
    }

    #[test]
    fn text_content_concatenates_subtree() {
        let (doc, ids) = doc_with(&["div"]);
        let span = doc.create_element("span");
        doc.append_child(ids[0], span);
        doc.set_text_content(span, "inner");
        let tail = doc.create_text(" tail");
        doc.append_child(ids[0], tail);
        assert_eq!(doc.text_content(ids[0]), "inner tail");

        doc.set_text_content(ids[0], "replaced");
        assert_eq!(doc.text_content(ids[0]), "replaced");
        assert_eq!(doc.children(ids[0]).len(), 1);
    }

    #[test]
    fn descendants_with_attr_in_document_order() {
        let (doc, ids) = doc_with(&["div", "div"]);
        let inner = doc.create_element("span");
        doc.append_child(ids[0], inner);
        doc.set_attr(inner, "bind", "a");
        doc.set_attr(ids[1], "bind", "b");
        assert_eq!(doc.descendants_with_attr(doc.root(), "bind"), vec![inner, ids[1]]);
    }

    #[test]
    fn queries_skip_template_content() {
        let (doc, ids) = doc_with(&["div"]);
        let template = doc.create_element("template");
        doc.append_child(ids[0], template);
        let inert = doc.create_element("span");
        doc.set_attr(inert, "bind", "hidden");
        doc.append_child(template, inert);

        assert!(doc.descendants_with_attr(doc.root(), "bind").is_empty());
        // find_descendant still reaches into templates.
        assert_eq!(
            doc.find_descendant(doc.root(), |d, n| d.has_attr(n, "bind")),
            Some(inert)
        );
    }

    #[test]
    fn clone_subtree_is_deep_and_detached() {
        let (doc, ids) = doc_with(&["div"]);
        let child = doc.create_element("span");
        doc.set_attr(child, "bind", "x");
        doc.append_child(ids[0], child);

        let copy = doc.clone_subtree(ids[0]);
        assert_eq!(doc.parent(copy), None);
        let copy_children = doc.children(copy);
        assert_eq!(copy_children.len(), 1);
        assert_eq!(doc.attr(copy_children[0], "bind").as_deref(), Some("x"));

        // Mutating the copy leaves the original alone.
        doc.set_attr(copy_children[0], "bind", "y");
        assert_eq!(doc.attr(child, "bind").as_deref(), Some("x"));
    }

    #[test]
    fn closest_with_attr_walks_ancestors() {
        let (doc, ids) = doc_with(&["div"]);
        doc.set_attr(ids[0], "navigate", "/home");
        let inner = doc.create_element("span");
        doc.append_child(ids[0], inner);
        assert_eq!(doc.closest_with_attr(inner, "navigate"), Some(ids[0]));
        assert_eq!(doc.closest_with_attr(inner, "missing"), None);
    }

    #[test]
    fn dispatch_runs_listeners_in_registration_order() {
        let (doc, ids) = doc_with(&["input"]);
        let log = Rc::new(RefCell::new(Vec::new()));
        let l1 = log.clone();
        let _s1 = doc.on(ids[0], EventKind::Blur, move |_| l1.borrow_mut().push(1));
        let l2 = log.clone();
        let _s2 = doc.on(ids[0], EventKind::Blur, move |_| l2.borrow_mut().push(2));
        doc.dispatch(ids[0], EventKind::Blur);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn dropping_subscription_detaches_listener() {
        let (doc, ids) = doc_with(&["input"]);
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let sub = doc.on(ids[0], EventKind::Blur, move |_| c.set(c.get() + 1));
        doc.dispatch(ids[0], EventKind::Blur);
        drop(sub);
        doc.dispatch(ids[0], EventKind::Blur);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn subscription_set_clear_detaches_everything() {
        let (doc, ids) = doc_with(&["input"]);
        let count = Rc::new(Cell::new(0));
        let mut set = SubscriptionSet::new();
        for _ in 0..3 {
            let c = count.clone();
            set.hold(doc.on(ids[0], EventKind::Change, move |_| c.set(c.get() + 1)));
        }
        assert_eq!(set.len(), 3);
        doc.dispatch(ids[0], EventKind::Change);
        assert_eq!(count.get(), 3);

        set.clear();
        assert!(set.is_empty());
        doc.dispatch(ids[0], EventKind::Change);
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn delegated_listener_sees_every_target() {
        let (doc, ids) = doc_with(&["div", "div"]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let _sub = doc.on_any(EventKind::Click, move |ev| s.borrow_mut().push(ev.target));
        doc.dispatch(ids[0], EventKind::Click);
        doc.dispatch(ids[1], EventKind::Click);
        assert_eq!(*seen.borrow(), vec![ids[0], ids[1]]);
    }

    #[test]
    fn listener_may_mutate_tree_during_dispatch() {
        let (doc, ids) = doc_with(&["div"]);
        let doc2 = doc.clone();
        let target = ids[0];
        let _sub = doc.on(target, EventKind::Click, move |_| {
            let span = doc2.create_element("span");
            doc2.append_child(target, span);
        });
        doc.dispatch(target, EventKind::Click);
        assert_eq!(doc.children(target).len(), 1);
    }

    #[test]
    fn element_by_id_reaches_template_content() {
        let (doc, ids) = doc_with(&["div"]);
        let template = doc.create_element("template");
        doc.set_attr(template, "id", "multi");
        doc.append_child(ids[0], template);
        assert_eq!(doc.element_by_id("multi"), Some(template));
        assert_eq!(doc.element_by_id("absent"), None);
    }

    #[test]
    fn title_roundtrip() {
        let doc = Document::new();
        assert_eq!(doc.title(), "");
        doc.set_title("Board 12");
        assert_eq!(doc.title(), "Board 12");
    }
}
