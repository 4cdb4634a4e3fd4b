//! Selector matching over the document tree.

use crate::document::{Document, NodeKind};
use css_selectors::ElementAdapter;
use indextree::NodeId;

/// A borrowed view of a [`Document`] that selector matching walks.
#[derive(Clone, Copy)]
pub struct DomAdapter<'doc> {
    doc: &'doc Document,
}

impl<'doc> DomAdapter<'doc> {
    pub const fn new(doc: &'doc Document) -> Self {
        Self { doc }
    }
}

impl ElementAdapter for DomAdapter<'_> {
    type Handle = NodeId;

    fn parent(&self, element: NodeId) -> Option<NodeId> {
        self.doc.parent_element(element)
    }

    fn previous_sibling_element(&self, element: NodeId) -> Option<NodeId> {
        self.doc.previous_element_sibling(element)
    }

    fn next_sibling_element(&self, element: NodeId) -> Option<NodeId> {
        self.doc.next_element_sibling(element)
    }

    fn tag_name(&self, element: NodeId) -> &str {
        self.doc.tag_name(element).unwrap_or_default()
    }

    fn element_id(&self, element: NodeId) -> Option<&str> {
        self.doc.attribute(element, "id")
    }

    fn has_class(&self, element: NodeId, class: &str) -> bool {
        self.doc
            .attribute(element, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|token| token == class))
    }

    fn attr(&self, element: NodeId, name: &str) -> Option<&str> {
        self.doc.attribute(element, name)
    }

    fn is_root(&self, element: NodeId) -> bool {
        self.doc
            .parent(element)
            .and_then(|parent| self.doc.node(parent))
            .is_some_and(|parent| parent.kind == NodeKind::Document)
    }
}
