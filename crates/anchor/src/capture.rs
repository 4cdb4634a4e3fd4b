//! Turning a click on an element into an [`Anchor`].

use crate::model::{Anchor, PercentPoint, Placement, TextQuote};
use crate::selector_gen::synthesize_selector;
use crate::xpath::element_xpath;
use dom::{Document, NodeId, Rect};

/// Longest `exact` kept in a text quote, in characters.
pub const EXACT_MAX_CHARS: usize = 100;
/// Longest `prefix`/`suffix` kept in a text quote, in characters.
pub const CONTEXT_MAX_CHARS: usize = 50;

/// Capture an anchor for `element`.
///
/// `click` is the viewport point that was clicked. Without one the pin goes
/// to the element's top-left corner.
pub fn capture(doc: &Document, element: NodeId, click: Option<(f64, f64)>) -> Anchor {
    let rect = doc.bounding_client_rect(element);
    let offset = click.map_or(PercentPoint::ORIGIN, |(x, y)| percent_offset(rect, x, y));
    let anchor = Anchor {
        selector: synthesize_selector(doc, element),
        xpath: element_xpath(doc, element),
        text_quote: text_quote(doc, element),
        placement: Placement::Offset(offset),
    };
    log::debug!(
        target: "anchor::capture",
        "captured {:?} at ({:.1}%, {:.1}%)",
        anchor.selector,
        offset.x,
        offset.y
    );
    anchor
}

/// Hit test the viewport point and capture an anchor on whatever element is there.
pub fn capture_at_point(doc: &Document, x: f64, y: f64) -> Option<Anchor> {
    let Some(element) = doc.element_from_point(x, y) else {
        log::debug!(target: "anchor::capture", "no element under ({x}, {y})");
        return None;
    };
    Some(capture(doc, element, Some((x, y))))
}

/// Project a viewport point into percent of `rect`, clamped to the box.
///
/// A zero-sized axis yields 0 rather than dividing by zero.
pub fn percent_offset(rect: Rect, x: f64, y: f64) -> PercentPoint {
    PercentPoint::new(
        axis_percent(x - rect.left(), rect.width),
        axis_percent(y - rect.top(), rect.height),
    )
}

fn axis_percent(delta: f64, extent: f64) -> f64 {
    if extent == 0.0 || !extent.is_finite() {
        return 0.0;
    }
    let percent = delta / extent * 100.0;
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}

/// The element's own text plus context from its immediate sibling nodes.
///
/// `None` when the element's trimmed text is empty.
pub fn text_quote(doc: &Document, element: NodeId) -> Option<TextQuote> {
    let text = doc.text_content(element);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let prefix = doc.previous_sibling(element).and_then(|sibling| {
        let sibling_text = doc.text_content(sibling);
        non_empty(last_chars(sibling_text.trim(), CONTEXT_MAX_CHARS))
    });
    let suffix = doc.next_sibling(element).and_then(|sibling| {
        let sibling_text = doc.text_content(sibling);
        non_empty(first_chars(sibling_text.trim(), CONTEXT_MAX_CHARS))
    });
    Some(TextQuote {
        exact: first_chars(trimmed, EXACT_MAX_CHARS).to_owned(),
        prefix,
        suffix,
    })
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_owned())
}

fn first_chars(text: &str, count: usize) -> &str {
    text.char_indices()
        .nth(count)
        .map_or(text, |(end, _)| text.get(..end).unwrap_or(text))
}

fn last_chars(text: &str, count: usize) -> &str {
    let total = text.chars().count();
    if total <= count {
        return text;
    }
    text.char_indices()
        .nth(total - count)
        .map_or(text, |(start, _)| text.get(start..).unwrap_or(text))
}
