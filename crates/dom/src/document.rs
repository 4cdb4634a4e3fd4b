//! The document tree and its mutation, geometry and event APIs.

use crate::adapter::DomAdapter;
use crate::events::{DEFAULT_EVENT_CAPACITY, MutationKind, MutationRecord, PageEvent};
use crate::geometry::{Rect, Viewport};
use crate::layout::{self, LayoutBoxes};
use crate::parser;
use crate::style::{self, ComputedStyle, PointerEvents, Visibility};
use anyhow::{Context as _, Result, anyhow};
use indextree::{Arena, Node, NodeId};
use once_cell::unsync::OnceCell;
use smallvec::SmallVec;
use tokio::sync::broadcast;

/// What a node is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element { tag: String },
    Text { text: String },
    Comment { text: String },
}

/// A node stored in the document arena.
#[derive(Clone, Debug)]
pub struct DOMNode {
    pub kind: NodeKind,
    /// Attributes in source order. Always empty for non-elements.
    pub attrs: SmallVec<(String, String), 4>,
}

impl DOMNode {
    pub(crate) fn document() -> Self {
        Self {
            kind: NodeKind::Document,
            attrs: SmallVec::new(),
        }
    }

    /// An element; the tag is stored ASCII lowercase.
    pub fn element(tag: impl Into<String>) -> Self {
        let mut tag = tag.into();
        tag.make_ascii_lowercase();
        Self {
            kind: NodeKind::Element { tag },
            attrs: SmallVec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text { text: text.into() },
            attrs: SmallVec::new(),
        }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Comment { text: text.into() },
            attrs: SmallVec::new(),
        }
    }

    pub const fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A parsed page.
///
/// Node handles are [`NodeId`]s into the document arena. Handles of removed
/// nodes stay valid as values but every query treats them as absent.
pub struct Document {
    pub(crate) arena: Arena<DOMNode>,
    root: NodeId,
    viewport: Viewport,
    events: broadcast::Sender<PageEvent>,
    layout: OnceCell<LayoutBoxes>,
}

impl Document {
    /// An empty document (only the document node).
    pub fn new(viewport: Viewport) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(DOMNode::document());
        let (events, _) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        Self {
            arena,
            root,
            viewport,
            events,
            layout: OnceCell::new(),
        }
    }

    /// Parse an HTML string into a document.
    ///
    /// # Errors
    /// Returns an error if the html5ever input sink fails.
    pub fn parse(html: &str, viewport: Viewport) -> Result<Self> {
        let mut doc = Self::new(viewport);
        parser::parse_into(&mut doc, html).context("failed to parse HTML")?;
        log::debug!(target: "dom", "parsed document with {} nodes", doc.arena.len());
        Ok(doc)
    }

    /// The document node.
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// The node data, or `None` for removed handles.
    pub fn node(&self, id: NodeId) -> Option<&DOMNode> {
        self.arena
            .get(id)
            .filter(|node| !node.is_removed())
            .map(Node::get)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(DOMNode::is_element)
    }

    /// The `<html>` element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.root
            .children(&self.arena)
            .find(|child| self.is_element(*child))
    }

    /// The `<body>` element.
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        html.children(&self.arena)
            .find(|child| self.tag_name(*child) == Some("body"))
    }

    /// Lowercase tag name of an element.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Element { tag } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)?.attribute(name)
    }

    /// Parent node of any kind.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?;
        self.arena.get(id)?.parent()
    }

    /// Parent, only if it is an element.
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|parent| self.is_element(*parent))
    }

    /// Previous sibling node of any kind (text and comments included).
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?;
        self.arena.get(id)?.previous_sibling()
    }

    /// Next sibling node of any kind (text and comments included).
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?;
        self.arena.get(id)?.next_sibling()
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?;
        id.preceding_siblings(&self.arena)
            .skip(1)
            .find(|sibling| self.is_element(*sibling))
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?;
        id.following_siblings(&self.arena)
            .skip(1)
            .find(|sibling| self.is_element(*sibling))
    }

    /// Child nodes of any kind.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        if self.node(id).is_none() {
            return Vec::new();
        }
        id.children(&self.arena).collect()
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .into_iter()
            .filter(|child| self.is_element(*child))
            .collect()
    }

    /// Every element attached to the document, in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.root
            .descendants(&self.arena)
            .filter(move |id| self.is_element(*id))
    }

    /// Element descendants of `id` in document order, `id` excluded.
    pub fn element_descendants(&self, id: NodeId) -> Vec<NodeId> {
        if self.node(id).is_none() {
            return Vec::new();
        }
        id.descendants(&self.arena)
            .skip(1)
            .filter(|descendant| self.is_element(*descendant))
            .collect()
    }

    /// `Node.textContent`: concatenated descendant text for elements, the data for text and comments.
    pub fn text_content(&self, id: NodeId) -> String {
        match self.node(id).map(|node| &node.kind) {
            Some(NodeKind::Text { text } | NodeKind::Comment { text }) => text.clone(),
            Some(NodeKind::Element { .. } | NodeKind::Document) => id
                .descendants(&self.arena)
                .filter_map(|descendant| match &self.arena.get(descendant)?.get().kind {
                    NodeKind::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
            None => String::new(),
        }
    }

    /// True when `id` is attached to this document's tree.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.node(id).is_some() && id.ancestors(&self.arena).any(|ancestor| ancestor == self.root)
    }

    /// `Node.contains`: true when `other` is `id` or one of its descendants.
    pub fn contains(&self, id: NodeId, other: NodeId) -> bool {
        self.node(id).is_some()
            && self.node(other).is_some()
            && other.ancestors(&self.arena).any(|ancestor| ancestor == id)
    }

    /// The selector-matching view of this document.
    pub const fn adapter(&self) -> DomAdapter<'_> {
        DomAdapter::new(self)
    }

    /// `document.querySelectorAll`.
    ///
    /// # Errors
    /// Returns an error if `selectors` does not parse.
    pub fn query_selector_all(&self, selectors: &str) -> Result<Vec<NodeId>> {
        let list = css_selectors::parse_selector_list(selectors)
            .with_context(|| format!("invalid selector {selectors:?}"))?;
        Ok(css_selectors::query_all(&self.adapter(), self.elements(), &list))
    }

    /// `document.querySelector`.
    ///
    /// # Errors
    /// Returns an error if `selectors` does not parse.
    pub fn query_selector(&self, selectors: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(selectors)?.into_iter().next())
    }

    /// The element with the given `id` attribute, if any.
    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.elements()
            .find(|id| self.attribute(*id, "id") == Some(element_id))
    }

    /// A new detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena.new_node(DOMNode::element(tag))
    }

    /// A new detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.arena.new_node(DOMNode::text(text))
    }

    /// Append `child` as the last child of `parent`, moving it if already attached.
    ///
    /// # Errors
    /// Returns an error if either node was removed or the move would create a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let old_parent = self.parent(child);
        parent
            .checked_append(child, &mut self.arena)
            .context("cannot append child")?;
        self.child_list_changed(old_parent, parent);
        Ok(())
    }

    /// Insert `child` before `reference`, moving it if already attached.
    ///
    /// # Errors
    /// Returns an error if `reference` is detached, a node was removed, or the
    /// insertion would create a cycle.
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) -> Result<()> {
        let parent = self
            .parent(reference)
            .ok_or_else(|| anyhow!("reference node has no parent"))?;
        let old_parent = self.parent(child);
        reference
            .checked_insert_before(child, &mut self.arena)
            .context("cannot insert node")?;
        self.child_list_changed(old_parent, parent);
        Ok(())
    }

    fn child_list_changed(&mut self, old_parent: Option<NodeId>, new_parent: NodeId) {
        self.invalidate_layout();
        if let Some(old) = old_parent.filter(|old| *old != new_parent) {
            self.emit_mutation(MutationKind::ChildList, old);
        }
        self.emit_mutation(MutationKind::ChildList, new_parent);
    }

    /// Remove `id` and its subtree from the document.
    pub fn remove(&mut self, id: NodeId) {
        if self.node(id).is_none() || id == self.root {
            return;
        }
        let parent = self.parent(id);
        id.remove_subtree(&mut self.arena);
        self.invalidate_layout();
        if let Some(parent) = parent {
            self.emit_mutation(MutationKind::ChildList, parent);
        }
    }

    /// Set an attribute on an element.
    ///
    /// # Errors
    /// Returns an error if `id` is not a live element.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        let node = self.element_mut(id)?;
        let name = name.to_ascii_lowercase();
        if let Some(slot) = node.attrs.iter_mut().find(|(key, _)| *key == name) {
            value.clone_into(&mut slot.1);
        } else {
            node.attrs.push((name.clone(), value.to_owned()));
        }
        self.invalidate_layout();
        self.emit_mutation(MutationKind::Attributes { name }, id);
        Ok(())
    }

    /// Remove an attribute. Removing an absent attribute is not a mutation.
    ///
    /// # Errors
    /// Returns an error if `id` is not a live element.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<()> {
        let node = self.element_mut(id)?;
        let before = node.attrs.len();
        node.attrs.retain(|(key, _)| key != name);
        if node.attrs.len() != before {
            self.invalidate_layout();
            self.emit_mutation(
                MutationKind::Attributes {
                    name: name.to_owned(),
                },
                id,
            );
        }
        Ok(())
    }

    /// Set (or with `None`, remove) one inline style declaration.
    ///
    /// # Errors
    /// Returns an error if `id` is not a live element.
    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: Option<&str>) -> Result<()> {
        let current = self.attribute(id, "style").unwrap_or_default();
        let rewritten = style::with_declaration(current, property, value);
        if rewritten.is_empty() {
            self.remove_attribute(id, "style")
        } else {
            self.set_attribute(id, "style", &rewritten)
        }
    }

    /// The inline value of one style property, if declared.
    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        style::declared_value(self.attribute(id, "style")?, property)
    }

    /// `Node.textContent = text`: replaces an element's children with one text node,
    /// or the data of a text or comment node.
    ///
    /// # Errors
    /// Returns an error if `id` was removed or is the document node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<()> {
        let kind = self
            .node(id)
            .map(|node| node.kind.clone())
            .ok_or_else(|| anyhow!("node was removed"))?;
        match kind {
            NodeKind::Text { .. } | NodeKind::Comment { .. } => {
                if let Some(node) = self.arena.get_mut(id) {
                    match &mut node.get_mut().kind {
                        NodeKind::Text { text: data } | NodeKind::Comment { text: data } => {
                            text.clone_into(data);
                        }
                        NodeKind::Element { .. } | NodeKind::Document => {}
                    }
                }
                self.invalidate_layout();
                self.emit_mutation(MutationKind::CharacterData, id);
            }
            NodeKind::Element { .. } => {
                for child in self.children(id) {
                    child.remove_subtree(&mut self.arena);
                }
                if !text.is_empty() {
                    let text_node = self.create_text(text);
                    id.checked_append(text_node, &mut self.arena)
                        .context("cannot append text")?;
                }
                self.invalidate_layout();
                self.emit_mutation(MutationKind::ChildList, id);
            }
            NodeKind::Document => return Err(anyhow!("cannot set text of the document node")),
        }
        Ok(())
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut DOMNode> {
        self.arena
            .get_mut(id)
            .filter(|node| !node.is_removed())
            .map(Node::get_mut)
            .filter(|node| node.is_element())
            .ok_or_else(|| anyhow!("not a live element"))
    }

    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Scroll the viewport, clamped to the scrollable area, and notify observers.
    pub fn scroll_to(&mut self, x: f64, y: f64) {
        let (max_x, max_y) = {
            let boxes = self.layout();
            (
                (boxes.scroll_width - self.viewport.width).max(0.0),
                (boxes.scroll_height - self.viewport.height).max(0.0),
            )
        };
        self.viewport.scroll_x = x.clamp(0.0, max_x);
        self.viewport.scroll_y = y.clamp(0.0, max_y);
        log::trace!(
            target: "dom::events",
            "scroll to ({}, {})",
            self.viewport.scroll_x,
            self.viewport.scroll_y
        );
        self.emit(PageEvent::Scroll {
            x: self.viewport.scroll_x,
            y: self.viewport.scroll_y,
        });
    }

    /// Scroll by a delta.
    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.scroll_to(self.viewport.scroll_x + dx, self.viewport.scroll_y + dy);
    }

    /// Change the viewport size and notify observers.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.width = width.max(0.0);
        self.viewport.height = height.max(0.0);
        self.invalidate_layout();
        let boxes = self.layout();
        let max_x = (boxes.scroll_width - self.viewport.width).max(0.0);
        let max_y = (boxes.scroll_height - self.viewport.height).max(0.0);
        self.viewport.scroll_x = self.viewport.scroll_x.min(max_x);
        self.viewport.scroll_y = self.viewport.scroll_y.min(max_y);
        self.emit(PageEvent::Resize {
            width: self.viewport.width,
            height: self.viewport.height,
        });
    }

    /// `document.documentElement.scrollHeight`.
    pub fn scroll_height(&self) -> f64 {
        self.layout().scroll_height
    }

    /// Computed style of an element. Detached and removed nodes get the initial style.
    pub fn computed_style(&self, id: NodeId) -> ComputedStyle {
        self.layout().styles.get(&id).cloned().unwrap_or_default()
    }

    /// `Element.getBoundingClientRect`: border box relative to the viewport.
    ///
    /// Elements without a box (detached, `display: contents`, or inside
    /// `display: none`) get an all-zero rect.
    pub fn bounding_client_rect(&self, id: NodeId) -> Rect {
        let Some(entry) = self.layout().boxes.get(&id) else {
            return Rect::default();
        };
        if entry.fixed {
            entry.rect
        } else {
            entry
                .rect
                .translated(-self.viewport.scroll_x, -self.viewport.scroll_y)
        }
    }

    /// `document.elementFromPoint` in viewport coordinates.
    ///
    /// The hit is the last element in document order whose box contains the point,
    /// skipping elements that are hidden or have `pointer-events: none`.
    pub fn element_from_point(&self, x: f64, y: f64) -> Option<NodeId> {
        if x < 0.0 || y < 0.0 || x > self.viewport.width || y > self.viewport.height {
            return None;
        }
        let boxes = self.layout();
        self.elements()
            .filter(|id| {
                boxes.styles.get(id).is_some_and(|computed| {
                    computed.visibility != Visibility::Hidden
                        && computed.pointer_events != PointerEvents::None
                })
            })
            .filter(|id| {
                let rect = self.bounding_client_rect(*id);
                rect.width > 0.0 && rect.height > 0.0 && rect.contains(x, y)
            })
            .last()
    }

    /// Subscribe to page events. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.events.subscribe()
    }

    /// Number of live event subscriptions.
    pub fn observer_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Report that a CSS transition on `property` finished on `target`.
    pub fn dispatch_transition_end(&self, target: NodeId, property: &str) {
        self.emit(PageEvent::TransitionEnd {
            target,
            property: property.to_owned(),
        });
    }

    fn emit_mutation(&self, kind: MutationKind, target: NodeId) {
        self.emit(PageEvent::Mutation(MutationRecord { kind, target }));
    }

    fn emit(&self, event: PageEvent) {
        if self.events.send(event).is_err() {
            log::trace!(target: "dom::events", "page event dropped: no observers");
        }
    }

    fn layout(&self) -> &LayoutBoxes {
        self.layout.get_or_init(|| layout::compute(self))
    }

    fn invalidate_layout(&mut self) {
        self.layout = OnceCell::new();
    }
}
