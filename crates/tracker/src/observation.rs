//! Scoped subscription to a page's events.

use anyhow::{Result, anyhow};
use dom::{Document, PageEvent};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::config::TrackerConfig;

/// Holds the tracker's page subscription. Dropping it unsubscribes.
pub struct Observation {
    receiver: broadcast::Receiver<PageEvent>,
    config: TrackerConfig,
}

impl Observation {
    /// Subscribe to `doc`'s events.
    pub fn acquire(doc: &Document, config: &TrackerConfig) -> Self {
        log::debug!(target: "pin_tracker::observation", "subscribing to page events");
        Self {
            receiver: doc.subscribe(),
            config: config.clone(),
        }
    }

    /// Consume every queued event and report whether any of them can move a pin.
    ///
    /// A lagged receiver missed events it cannot inspect and counts as relevant.
    ///
    /// # Errors
    /// Returns an error if the page's event channel closed.
    pub fn drain(&mut self, doc: &Document) -> Result<bool> {
        let mut relevant = false;
        loop {
            match self.receiver.try_recv() {
                Ok(event) => relevant |= self.is_relevant(doc, &event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Lagged(skipped)) => {
                    log::debug!(
                        target: "pin_tracker::observation",
                        "observer lagged by {skipped} events; forcing recompute"
                    );
                    relevant = true;
                }
                Err(TryRecvError::Closed) => {
                    return Err(anyhow!("page event channel closed"));
                }
            }
        }
        Ok(relevant)
    }

    /// Whether a single event calls for a recompute.
    pub fn is_relevant(&self, doc: &Document, event: &PageEvent) -> bool {
        match event {
            PageEvent::Scroll { .. } | PageEvent::Resize { .. } => true,
            PageEvent::Mutation(record) => doc
                .body()
                .is_some_and(|body| doc.contains(body, record.target)),
            PageEvent::TransitionEnd { property, .. } => self.config.watches_transition(property),
        }
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        log::debug!(target: "pin_tracker::observation", "releasing page event subscription");
    }
}
