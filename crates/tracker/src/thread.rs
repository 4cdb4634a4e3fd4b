//! What the tracker needs to know about a comment thread.

use anchor::Anchor;
use serde::{Deserialize, Serialize};

/// Anything with a stable id and an anchor can be tracked.
pub trait AnchoredThread {
    fn thread_id(&self) -> &str;
    fn anchor(&self) -> &Anchor;
}

/// The minimal thread record: `{id, anchor}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub anchor: Anchor,
}

impl Thread {
    pub fn new(id: impl Into<String>, anchor: Anchor) -> Self {
        Self {
            id: id.into(),
            anchor,
        }
    }
}

impl AnchoredThread for Thread {
    fn thread_id(&self) -> &str {
        &self.id
    }

    fn anchor(&self) -> &Anchor {
        &self.anchor
    }
}

impl<T: AnchoredThread> AnchoredThread for &T {
    fn thread_id(&self) -> &str {
        (*self).thread_id()
    }

    fn anchor(&self) -> &Anchor {
        (*self).anchor()
    }
}
