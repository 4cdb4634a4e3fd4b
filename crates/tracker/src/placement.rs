//! Where pins and their popovers go on screen.

use std::collections::HashMap;

use anchor::Position;
use dom::Viewport;

use crate::thread::AnchoredThread;

/// Width of an open comment popover.
pub const POPOVER_WIDTH: f64 = 288.0;
/// Gap kept between a popover and the viewport edge.
pub const MARGIN: f64 = 16.0;
/// Below this much room under the pin, a popover may open upwards.
pub const MIN_SPACE_BELOW: f64 = 200.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PopoverPlacement {
    pub side: Side,
    pub above: bool,
}

/// A pin ready to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct VisiblePin {
    pub thread_id: String,
    /// 1-based label, following the thread order.
    pub number: usize,
    pub position: Position,
}

/// Document-relative pin position to viewport coordinates.
pub fn viewport_point(position: Position, viewport: Viewport) -> (f64, f64) {
    (position.x, position.y - viewport.scroll_y)
}

/// Pick the side and vertical direction of the popover for a pin at viewport `(x, y)`.
pub fn popover_placement(x: f64, y: f64, viewport: Viewport) -> PopoverPlacement {
    let needed = POPOVER_WIDTH + MARGIN;
    let room_right = viewport.width - x;
    let room_left = x;
    let side = if room_right >= needed {
        Side::Right
    } else if room_left >= needed {
        Side::Left
    } else if room_right >= room_left {
        Side::Right
    } else {
        Side::Left
    };

    let space_below = viewport.height - y - MARGIN;
    let space_above = y - MARGIN;
    PopoverPlacement {
        side,
        above: space_below < MIN_SPACE_BELOW && space_above > space_below,
    }
}

/// Pins to draw: threads in order, numbered from 1, skipping unplaced threads.
pub fn visible_pins<T: AnchoredThread>(threads: &[T], positions: &HashMap<String, Position>) -> Vec<VisiblePin> {
    threads
        .iter()
        .enumerate()
        .filter_map(|(index, thread)| {
            let position = positions.get(thread.thread_id()).filter(|position| position.found)?;
            Some(VisiblePin {
                thread_id: thread.thread_id().to_owned(),
                number: index + 1,
                position: *position,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Viewport = Viewport {
        width: 1000.0,
        height: 800.0,
        scroll_x: 0.0,
        scroll_y: 0.0,
    };

    #[test]
    fn prefers_the_right_side() {
        assert_eq!(popover_placement(100.0, 100.0, SCREEN).side, Side::Right);
        assert_eq!(popover_placement(696.0, 100.0, SCREEN).side, Side::Right);
        assert_eq!(popover_placement(697.0, 100.0, SCREEN).side, Side::Left);
    }

    #[test]
    fn narrow_viewports_use_the_roomier_side() {
        let narrow = Viewport { width: 400.0, ..SCREEN };
        assert_eq!(popover_placement(150.0, 100.0, narrow).side, Side::Right);
        assert_eq!(popover_placement(250.0, 100.0, narrow).side, Side::Left);
    }

    #[test]
    fn opens_upwards_near_the_bottom() {
        assert!(!popover_placement(100.0, 100.0, SCREEN).above);
        assert!(popover_placement(100.0, 700.0, SCREEN).above);
        let short = Viewport { height: 300.0, ..SCREEN };
        assert!(!popover_placement(100.0, 100.0, short).above);
    }
}
