//! Host page model.
//!
//! A [`Document`] is an arena-backed DOM tree parsed with html5ever. On top of the
//! tree it offers what an annotation layer needs from a browser page: computed
//! style from inline declarations, block-flow boxes and `getBoundingClientRect`,
//! hit testing, a scrollable viewport, selector queries, and a broadcast stream of
//! [`PageEvent`]s for mutations, scrolling, resizing and finished transitions.

mod adapter;
mod document;
mod events;
mod geometry;
mod layout;
mod parser;
pub mod style;

pub use adapter::DomAdapter;
pub use document::{DOMNode, Document, NodeKind};
pub use events::{DEFAULT_EVENT_CAPACITY, MutationKind, MutationRecord, PageEvent};
pub use geometry::{Rect, Viewport};
pub use indextree::NodeId;
pub use layout::TEXT_LINE_HEIGHT;
pub use style::ComputedStyle;
