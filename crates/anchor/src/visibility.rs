//! Whether a resolved element can currently be seen.

use dom::style::{Display, Visibility};
use dom::{Document, NodeId, Rect};

/// True when `element` is displayed, not transparent, has a box, overlaps the
/// viewport, and is not cut off entirely by a clipping ancestor.
///
/// Cheap checks run first; the ancestor walk runs last.
pub fn is_visible(doc: &Document, element: NodeId) -> bool {
    let style = doc.computed_style(element);
    if style.display == Display::None || style.visibility == Visibility::Hidden || style.opacity == 0.0 {
        return false;
    }
    let rect = doc.bounding_client_rect(element);
    if rect.is_empty() {
        return false;
    }
    let viewport = doc.viewport();
    if rect.right() < 0.0 || rect.left() > viewport.width {
        return false;
    }
    if rect.bottom() < 0.0 || rect.top() > viewport.height {
        return false;
    }
    !is_clipped_by_ancestor(doc, element, rect)
}

/// True when an ancestor below `<body>` clips overflow and `rect` lies entirely outside it.
pub fn is_clipped_by_ancestor(doc: &Document, element: NodeId, rect: Rect) -> bool {
    let body = doc.body();
    let html = doc.document_element();
    let mut ancestor = doc.parent_element(element);
    while let Some(current) = ancestor {
        if Some(current) == body || Some(current) == html {
            break;
        }
        if doc.computed_style(current).clips_overflow() {
            let clip = doc.bounding_client_rect(current);
            if rect.right() <= clip.left()
                || rect.left() >= clip.right()
                || rect.bottom() <= clip.top()
                || rect.top() >= clip.bottom()
            {
                log::trace!(target: "anchor::visibility", "element clipped by an overflow ancestor");
                return true;
            }
        }
        ancestor = doc.parent_element(current);
    }
    false
}
