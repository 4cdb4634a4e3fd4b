//! Anchor records and derived pin positions.

use serde::{Deserialize, Serialize};

/// A point expressed in percent (0 to 100) of some reference box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PercentPoint {
    pub x: f64,
    pub y: f64,
}

impl PercentPoint {
    /// The middle of the box.
    pub const CENTER: Self = Self { x: 50.0, y: 50.0 };

    /// The top-left corner.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Text of the anchored element plus the text right around it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextQuote {
    /// Up to 100 characters of the element's trimmed text.
    pub exact: String,
    /// Up to 50 trailing characters of the previous sibling's trimmed text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Up to 50 leading characters of the next sibling's trimmed text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

/// Where on (or over) the anchored element the pin sits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    /// Percent of the element's bounding box. Written by every capture.
    Offset(PercentPoint),
    /// Percent of the viewport width and document height. Only read from old records.
    LegacyRect(PercentPoint),
}

/// A durable reference to a point on a page element.
///
/// Anchors are created once when a comment is placed and never change. The
/// persisted shape is `{selector, xpath, textQuote?, offset? | rect?}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "AnchorRecord", into = "AnchorRecord")]
pub struct Anchor {
    pub selector: String,
    /// Empty when the record predates xpaths; resolution then skips it.
    pub xpath: String,
    pub text_quote: Option<TextQuote>,
    pub placement: Placement,
}

/// The stored form of an [`Anchor`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnchorRecord {
    selector: String,
    #[serde(default)]
    xpath: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text_quote: Option<TextQuote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    offset: Option<PercentPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rect: Option<PercentPoint>,
}

impl From<AnchorRecord> for Anchor {
    fn from(record: AnchorRecord) -> Self {
        let placement = match (record.offset, record.rect) {
            (Some(offset), _) => Placement::Offset(offset),
            (None, Some(rect)) => Placement::LegacyRect(rect),
            (None, None) => Placement::Offset(PercentPoint::CENTER),
        };
        Self {
            selector: record.selector,
            xpath: record.xpath,
            text_quote: record.text_quote,
            placement,
        }
    }
}

impl From<Anchor> for AnchorRecord {
    fn from(anchor: Anchor) -> Self {
        let (offset, rect) = match anchor.placement {
            Placement::Offset(offset) => (Some(offset), None),
            Placement::LegacyRect(rect) => (None, Some(rect)),
        };
        Self {
            selector: anchor.selector,
            xpath: anchor.xpath,
            text_quote: anchor.text_quote,
            offset,
            rect,
        }
    }
}

/// A derived pin location: viewport x, document y (viewport y plus vertical scroll).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub found: bool,
}

impl Position {
    /// Returned whenever the anchor cannot be shown.
    pub const NOT_FOUND: Self = Self {
        x: 0.0,
        y: 0.0,
        found: false,
    };

    pub const fn found(x: f64, y: f64) -> Self {
        Self { x, y, found: true }
    }
}
