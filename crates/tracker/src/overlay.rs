//! Clicking through the comment overlay onto the page beneath it.

use anchor::{Anchor, capture};
use anyhow::Result;
use dom::{Document, NodeId};

/// Attribute marking the annotation layer's own UI.
pub const OVERLAY_MARKER: &str = "data-design-comments";

/// Sets `pointer-events: none` on the overlay element and restores the
/// previous inline value when dropped.
pub struct PointerPassthrough<'doc> {
    doc: &'doc mut Document,
    overlay: NodeId,
    previous: Option<String>,
}

impl<'doc> PointerPassthrough<'doc> {
    /// # Errors
    /// Returns an error if `overlay` is not an element of `doc`.
    pub fn engage(doc: &'doc mut Document, overlay: NodeId) -> Result<Self> {
        let previous = doc.style_property(overlay, "pointer-events");
        doc.set_style_property(overlay, "pointer-events", Some("none"))?;
        Ok(Self {
            doc,
            overlay,
            previous,
        })
    }

    pub fn document(&self) -> &Document {
        self.doc
    }
}

impl Drop for PointerPassthrough<'_> {
    fn drop(&mut self) {
        let restored = self
            .doc
            .set_style_property(self.overlay, "pointer-events", self.previous.as_deref());
        if let Err(err) = restored {
            log::warn!(target: "pin_tracker::overlay", "failed to restore overlay pointer-events: {err}");
        }
    }
}

/// Capture an anchor for the page element under a click on the overlay.
///
/// The overlay is made transparent to hit testing for the duration of the
/// lookup. Hits on the annotation layer's own UI yield `None`.
///
/// # Errors
/// Returns an error if `overlay` is not an element of `doc`.
pub fn capture_click(doc: &mut Document, overlay: NodeId, x: f64, y: f64) -> Result<Option<Anchor>> {
    let passthrough = PointerPassthrough::engage(doc, overlay)?;
    let page = passthrough.document();
    let Some(hit) = page.element_from_point(x, y) else {
        log::debug!(target: "pin_tracker::overlay", "click at ({x}, {y}) hit nothing");
        return Ok(None);
    };
    if is_overlay_ui(page, hit) {
        log::debug!(target: "pin_tracker::overlay", "click at ({x}, {y}) landed on comment UI");
        return Ok(None);
    }
    Ok(Some(capture(page, hit, Some((x, y)))))
}

/// True when `element` is, or sits inside, an element carrying [`OVERLAY_MARKER`].
pub fn is_overlay_ui(doc: &Document, element: NodeId) -> bool {
    let mut current = Some(element);
    while let Some(id) = current {
        if doc.attribute(id, OVERLAY_MARKER).is_some() {
            return true;
        }
        current = doc.parent_element(id);
    }
    false
}
