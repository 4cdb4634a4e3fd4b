//! Keeps comment pin positions current while the page moves underneath them.
//!
//! A [`PositionTracker`] subscribes to a [`dom::Document`], and on every scroll,
//! resize, body mutation or layout-affecting transition it re-resolves every
//! thread's anchor into a [`anchor::Position`].

mod config;
mod observation;
pub mod overlay;
pub mod placement;
mod thread;
mod tracker;

pub use config::{DEFAULT_TRANSITION_PROPERTIES, TrackerConfig};
pub use observation::Observation;
pub use overlay::{OVERLAY_MARKER, PointerPassthrough, capture_click};
pub use placement::{PopoverPlacement, Side, VisiblePin, popover_placement, viewport_point, visible_pins};
pub use thread::{AnchoredThread, Thread};
pub use tracker::PositionTracker;
