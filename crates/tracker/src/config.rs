//! Tracker configuration.
//!
//! Settings can be constructed programmatically or loaded from environment
//! variables.

use core::time::Duration;
use std::env;

/// CSS properties whose finished transitions can move or hide an anchored element.
pub const DEFAULT_TRANSITION_PROPERTIES: [&str; 5] =
    ["transform", "opacity", "visibility", "max-height", "height"];

/// Runtime configuration of a [`crate::PositionTracker`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Minimum time between two full recomputes. `None` recomputes on every relevant pump.
    pub debounce: Option<Duration>,
    /// `transitionend` properties that trigger a recompute.
    pub transition_properties: Vec<String>,
}

impl TrackerConfig {
    /// Construct a config with explicit values.
    #[inline]
    #[must_use]
    pub fn new(debounce: Option<Duration>, transition_properties: Vec<String>) -> Self {
        Self {
            debounce: debounce.filter(|period| !period.is_zero()),
            transition_properties,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// - `PIN_TRACKER_DEBOUNCE_MS`: minimum milliseconds between recomputes (unset or 0: none)
    /// - `PIN_TRACKER_TRANSITION_PROPERTIES`: comma separated property names
    ///   (default: `transform,opacity,visibility,max-height,height`)
    #[must_use]
    pub fn from_env() -> Self {
        let debounce = env::var("PIN_TRACKER_DEBOUNCE_MS")
            .ok()
            .and_then(|val| val.trim().parse::<u64>().ok())
            .and_then(|millis| (millis > 0).then_some(millis))
            .map(Duration::from_millis);
        let transition_properties = env::var("PIN_TRACKER_TRANSITION_PROPERTIES")
            .ok()
            .map(|val| parse_property_list(&val))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(default_properties);
        Self::new(debounce, transition_properties)
    }

    /// True when a finished transition on `property` should trigger a recompute.
    pub fn watches_transition(&self, property: &str) -> bool {
        self.transition_properties
            .iter()
            .any(|watched| watched.eq_ignore_ascii_case(property))
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new(None, default_properties())
    }
}

fn default_properties() -> Vec<String> {
    DEFAULT_TRANSITION_PROPERTIES
        .iter()
        .map(|property| (*property).to_owned())
        .collect()
}

fn parse_property_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|property| !property.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_lists_are_trimmed_and_lowercased() {
        assert_eq!(
            parse_property_list(" Transform, ,opacity ,"),
            vec!["transform".to_owned(), "opacity".to_owned()]
        );
    }

    #[test]
    fn zero_debounce_means_none() {
        let config = TrackerConfig::new(Some(Duration::ZERO), Vec::new());
        assert_eq!(config.debounce, None);
    }

    #[test]
    fn defaults_watch_layout_affecting_transitions() {
        let config = TrackerConfig::default();
        for property in ["transform", "opacity", "visibility", "max-height", "height"] {
            assert!(config.watches_transition(property));
        }
        assert!(!config.watches_transition("color"));
    }
}
