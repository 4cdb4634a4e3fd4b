//! Page events broadcast to observers.
//!
//! Every mutation, scroll, resize and finished transition on a [`crate::Document`]
//! is published on a broadcast channel. Observers hold a receiver for as long as
//! they want to be notified and drop it to stop.

use indextree::NodeId;

/// Which part of a node a mutation touched, mirroring `MutationRecord.type`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationKind {
    /// Children were inserted into or removed from `target`.
    ChildList,
    /// An attribute of `target` changed.
    Attributes { name: String },
    /// The text of `target` (a text or comment node) changed.
    CharacterData,
}

/// A single DOM mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    /// The node whose child list, attributes, or data changed.
    pub target: NodeId,
}

/// Events a page delivers to its observers.
#[derive(Clone, Debug, PartialEq)]
pub enum PageEvent {
    /// The viewport scrolled to a new offset.
    Scroll { x: f64, y: f64 },
    /// The viewport changed size.
    Resize { width: f64, height: f64 },
    /// The DOM changed.
    Mutation(MutationRecord),
    /// A CSS transition on `property` finished on `target`.
    TransitionEnd { target: NodeId, property: String },
}

/// Default capacity of the page event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;
