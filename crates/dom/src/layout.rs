//! Block-flow box generation.
//!
//! Every displayed element is a block stacked below its previous sibling. Text
//! runs that are not whitespace-only occupy one line of [`TEXT_LINE_HEIGHT`].
//! Widths default to the containing block, heights to the content. Absolutely
//! positioned boxes are placed by `left`/`top` inside their parent box and take
//! no room in the flow; fixed boxes are placed against the viewport.
//! `position: relative` offsets and `transform: translate*()` move a box
//! together with its descendants.

use crate::document::{Document, NodeKind};
use crate::geometry::Rect;
use crate::style::{ComputedStyle, Display, Position};
use indextree::NodeId;
use core::iter;
use std::collections::HashMap;

/// Height of one line of text.
pub const TEXT_LINE_HEIGHT: f64 = 20.0;

/// A laid out box. `rect` is in document coordinates, or viewport
/// coordinates when `fixed`. Elements without a box have no entry.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BoxEntry {
    pub rect: Rect,
    pub fixed: bool,
}

/// Styles and boxes of every attached element.
#[derive(Debug, Default)]
pub(crate) struct LayoutBoxes {
    pub styles: HashMap<NodeId, ComputedStyle>,
    pub boxes: HashMap<NodeId, BoxEntry>,
    pub scroll_width: f64,
    pub scroll_height: f64,
}

/// The block an element is laid out in.
#[derive(Clone, Copy)]
struct Containing {
    rect: Rect,
    fixed: bool,
}

struct LayoutPass<'doc> {
    doc: &'doc Document,
    out: LayoutBoxes,
}

pub(crate) fn compute(doc: &Document) -> LayoutBoxes {
    let viewport = doc.viewport();
    let mut pass = LayoutPass {
        doc,
        out: LayoutBoxes::default(),
    };
    let initial = Containing {
        rect: Rect::new(0.0, 0.0, viewport.width, viewport.height),
        fixed: false,
    };
    let mut cursor = 0.0;
    for child in doc.children(doc.root()) {
        if doc.is_element(child) {
            cursor += pass.layout_element(child, None, initial, cursor);
        }
    }
    let (right, bottom) = pass
        .out
        .boxes
        .values()
        .filter(|entry| !entry.fixed)
        .fold((0.0_f64, 0.0_f64), |(right, bottom), entry| {
            (right.max(entry.rect.right()), bottom.max(entry.rect.bottom()))
        });
    pass.out.scroll_width = right.max(viewport.width);
    pass.out.scroll_height = bottom.max(viewport.height);
    log::trace!(
        target: "dom::layout",
        "laid out {} boxes, scroll height {}",
        pass.out.boxes.len(),
        pass.out.scroll_height
    );
    pass.out
}

impl LayoutPass<'_> {
    /// Lay out `id` with its flow position at `cursor`. Returns the flow height consumed.
    fn layout_element(
        &mut self,
        id: NodeId,
        parent_style: Option<&ComputedStyle>,
        containing: Containing,
        cursor: f64,
    ) -> f64 {
        let doc = self.doc;
        let style = ComputedStyle::compute(
            doc.tag_name(id).unwrap_or_default(),
            doc.attribute(id, "hidden").is_some(),
            doc.attribute(id, "style"),
            parent_style,
        );

        if style.display == Display::None {
            self.hide_subtree(id, &style);
            return 0.0;
        }

        if style.display == Display::Contents {
            let consumed = self.layout_children(id, &style, containing, cursor);
            self.out.styles.insert(id, style);
            return consumed;
        }

        let outer = containing.rect;
        let (origin_x, origin_y, fixed, in_flow) = match style.position {
            Position::Absolute => (
                outer.x + style.left.map_or(0.0, |left| left.resolve(outer.width)),
                style
                    .top
                    .map_or(cursor, |top| outer.y + top.resolve(outer.height)),
                containing.fixed,
                false,
            ),
            Position::Fixed => {
                let viewport = doc.viewport();
                (
                    style.left.map_or(0.0, |left| left.resolve(viewport.width)),
                    style.top.map_or(0.0, |top| top.resolve(viewport.height)),
                    true,
                    false,
                )
            }
            Position::Static | Position::Relative => (outer.x, cursor, containing.fixed, true),
        };
        let reference_width = if style.position == Position::Fixed {
            doc.viewport().width
        } else {
            outer.width
        };
        let reference_height = if style.position == Position::Fixed {
            doc.viewport().height
        } else {
            outer.height
        };
        let width = style
            .width
            .map_or(reference_width, |width| width.resolve(reference_width))
            .max(0.0);
        let specified_height = style
            .height
            .map(|height| height.resolve(reference_height).max(0.0));

        let inner = Containing {
            rect: Rect::new(origin_x, origin_y, width, specified_height.unwrap_or(0.0)),
            fixed,
        };
        let content_height = self.layout_children(id, &style, inner, origin_y);
        let height = specified_height.unwrap_or(content_height);
        let rect = Rect::new(origin_x, origin_y, width, height);
        self.out.boxes.insert(id, BoxEntry { rect, fixed });

        let (mut dx, mut dy) = style.translate.resolve(width, height);
        if style.position == Position::Relative {
            dx += style.left.map_or(0.0, |left| left.resolve(outer.width));
            dy += style.top.map_or(0.0, |top| top.resolve(outer.height));
        }
        if dx != 0.0 || dy != 0.0 {
            self.shift_subtree(id, dx, dy);
        }

        self.out.styles.insert(id, style);
        if in_flow { height } else { 0.0 }
    }

    /// Lay out the children of `id` in flow starting at `cursor`. Returns the height used.
    fn layout_children(
        &mut self,
        id: NodeId,
        style: &ComputedStyle,
        containing: Containing,
        cursor: f64,
    ) -> f64 {
        let doc = self.doc;
        let mut position = cursor;
        for child in doc.children(id) {
            match doc.node(child).map(|node| &node.kind) {
                Some(NodeKind::Element { .. }) => {
                    position += self.layout_element(child, Some(style), containing, position);
                }
                Some(NodeKind::Text { text }) if !text.trim().is_empty() => {
                    position += TEXT_LINE_HEIGHT;
                }
                _ => {}
            }
        }
        position - cursor
    }

    /// Record styles for `id` and its element descendants, which get no boxes.
    fn hide_subtree(&mut self, id: NodeId, style: &ComputedStyle) {
        for child in self.doc.element_children(id) {
            let doc = self.doc;
            let child_style = ComputedStyle::compute(
                doc.tag_name(child).unwrap_or_default(),
                doc.attribute(child, "hidden").is_some(),
                doc.attribute(child, "style"),
                Some(style),
            );
            self.hide_subtree(child, &child_style);
            self.out.styles.insert(child, child_style);
        }
        self.out.styles.insert(id, style.clone());
    }

    fn shift_subtree(&mut self, id: NodeId, dx: f64, dy: f64) {
        let targets = iter::once(id).chain(self.doc.element_descendants(id));
        for target in targets {
            if let Some(entry) = self.out.boxes.get_mut(&target) {
                entry.rect = entry.rect.translated(dx, dy);
            }
        }
    }
}
