//! Anchors for comment pins on pages we do not control.
//!
//! [`capture`] turns a click on an element into an [`Anchor`]: a synthesized CSS
//! selector, an absolute xpath, a quote of the element's text with its
//! surroundings, and the click offset in percent of the element box.
//! [`resolve`] finds the element again after the page changed, and
//! [`element_position`] turns an anchor into a pin [`Position`], hiding pins
//! whose element is gone or not visible.

mod capture;
mod model;
mod position;
mod resolve;
mod selector_gen;
mod visibility;
pub mod xpath;

pub use capture::{
    CONTEXT_MAX_CHARS, EXACT_MAX_CHARS, capture, capture_at_point, percent_offset, text_quote,
};
pub use model::{Anchor, PercentPoint, Placement, Position, TextQuote};
pub use position::element_position;
pub use resolve::{
    Resolution, STRATEGIES, Strategy, StrategyFn, TextQuoteWeights, by_selector, by_text_quote,
    by_xpath, find_text_quote, resolve, resolve_with, score_candidate,
};
pub use selector_gen::synthesize_selector;
pub use visibility::{is_clipped_by_ancestor, is_visible};
