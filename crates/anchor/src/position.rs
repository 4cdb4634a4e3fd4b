//! Deriving a pin position from an anchor.

use crate::model::{Anchor, Placement, Position};
use crate::resolve::resolve;
use crate::visibility::is_visible;
use dom::Document;

/// Where the pin for `anchor` goes right now.
///
/// Offset anchors are placed on the resolved element's current box and report
/// `found: false` when the element is missing or not visible. Legacy anchors
/// scale their stored percentages against the viewport width and document
/// height; `found` then only says whether the element still resolves.
pub fn element_position(doc: &Document, anchor: &Anchor) -> Position {
    let Some(element) = resolve(doc, anchor) else {
        return Position::NOT_FOUND;
    };
    match anchor.placement {
        Placement::Offset(offset) => {
            if !is_visible(doc, element) {
                log::trace!(target: "anchor::position", "{:?} resolved but hidden", anchor.selector);
                return Position::NOT_FOUND;
            }
            let rect = doc.bounding_client_rect(element);
            Position::found(
                rect.left() + offset.x / 100.0 * rect.width,
                rect.top() + offset.y / 100.0 * rect.height + doc.viewport().scroll_y,
            )
        }
        Placement::LegacyRect(point) => Position::found(
            point.x / 100.0 * doc.viewport().width,
            point.y / 100.0 * doc.scroll_height(),
        ),
    }
}
