#![forbid(unsafe_code)]

//! Node storage for the document arena.

use ahash::AHashMap;

/// Opaque index of a node in a [`Document`](crate::Document) arena.
///
/// Ids are stable for the lifetime of the document; detaching a node does
/// not invalidate ids held elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw index value, mainly useful for debug output.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub data: NodeData,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub tag: String,
    pub attrs: AHashMap<String, String>,
    /// Ordered so class serialization is deterministic.
    pub classes: Vec<String>,
    pub value: String,
    pub checked: bool,
}

impl Element {
    pub(crate) fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: AHashMap::new(),
            classes: Vec::new(),
            value: String::new(),
            checked: false,
        }
    }

    /// Whether this element exposes an editable value slot (form controls),
    /// as opposed to plain text content.
    pub(crate) fn has_value_slot(&self) -> bool {
        matches!(
            self.tag.as_str(),
            "input" | "textarea" | "select" | "option" | "output"
        )
    }
}
