use std::collections::HashMap;
use std::time::Instant;

use anchor::{Position, element_position};
use anyhow::Result;
use dom::Document;
use tracing::info_span;

use crate::config::TrackerConfig;
use crate::observation::Observation;
use crate::thread::AnchoredThread;

/// Live map from thread id to pin position.
///
/// Every recompute re-derives the position of every thread from scratch. The
/// tracker only reads the page; events are pulled with [`PositionTracker::pump`].
pub struct PositionTracker {
    config: TrackerConfig,
    positions: HashMap<String, Position>,
    observation: Option<Observation>,
    last_recompute: Option<Instant>,
    /// A relevant event arrived but the recompute was held back by the debounce.
    pending: bool,
}

impl PositionTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            positions: HashMap::new(),
            observation: None,
            last_recompute: None,
            pending: false,
        }
    }

    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Subscribe to `doc` and compute the initial positions.
    pub fn start<T: AnchoredThread>(&mut self, doc: &Document, threads: &[T]) {
        if self.observation.is_none() {
            self.observation = Some(Observation::acquire(doc, &self.config));
        }
        self.recompute(doc, threads, Instant::now());
    }

    pub const fn is_tracking(&self) -> bool {
        self.observation.is_some()
    }

    /// Replace the tracked set. Positions of dropped threads disappear.
    pub fn set_threads<T: AnchoredThread>(&mut self, doc: &Document, threads: &[T]) {
        self.recompute(doc, threads, Instant::now());
    }

    /// Drain pending page events and recompute if any of them matter.
    ///
    /// # Returns
    /// Whether positions were recomputed.
    ///
    /// # Errors
    /// Returns an error if the page's event channel closed.
    pub fn pump<T: AnchoredThread>(&mut self, doc: &Document, threads: &[T]) -> Result<bool> {
        self.pump_at(doc, threads, Instant::now())
    }

    /// [`PositionTracker::pump`] with an explicit clock.
    ///
    /// With a debounce configured, a relevant event arriving sooner than the
    /// debounce period after the last recompute stays pending until a later pump.
    ///
    /// # Errors
    /// Returns an error if the page's event channel closed.
    pub fn pump_at<T: AnchoredThread>(&mut self, doc: &Document, threads: &[T], now: Instant) -> Result<bool> {
        let Some(observation) = self.observation.as_mut() else {
            return Ok(false);
        };
        if observation.drain(doc)? {
            self.pending = true;
        }
        if !self.pending || self.throttled(now) {
            return Ok(false);
        }
        self.recompute(doc, threads, now);
        Ok(true)
    }

    /// Recompute now regardless of pending events or debounce.
    pub fn refresh<T: AnchoredThread>(&mut self, doc: &Document, threads: &[T]) {
        self.recompute(doc, threads, Instant::now());
    }

    pub const fn positions(&self) -> &HashMap<String, Position> {
        &self.positions
    }

    pub fn position(&self, thread_id: &str) -> Option<Position> {
        self.positions.get(thread_id).copied()
    }

    /// Release the page subscription and forget every position.
    pub fn stop(&mut self) {
        self.observation = None;
        self.positions.clear();
        self.last_recompute = None;
        self.pending = false;
    }

    fn throttled(&self, now: Instant) -> bool {
        match (self.config.debounce, self.last_recompute) {
            (Some(period), Some(last)) => now.saturating_duration_since(last) < period,
            _ => false,
        }
    }

    fn recompute<T: AnchoredThread>(&mut self, doc: &Document, threads: &[T], now: Instant) {
        let _span = info_span!("pin_tracker.recompute", threads = threads.len()).entered();
        self.positions = threads
            .iter()
            .map(|thread| (thread.thread_id().to_owned(), element_position(doc, thread.anchor())))
            .collect();
        self.last_recompute = Some(now);
        self.pending = false;
        log::trace!(
            target: "pin_tracker",
            "recomputed {} positions ({} found)",
            self.positions.len(),
            self.positions.values().filter(|position| position.found).count()
        );
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}
