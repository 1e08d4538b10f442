// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture state: pending taps and active drags.

use canopy_dispatch::Event;
use kurbo::Point;

/// Taps and the double-click chain must start within this window.
pub const TAP_WINDOW_MS: u64 = 300;

/// A pending touch moving farther than this from its start point stops
/// being a tap, in device-independent pixels.
pub const TAP_SLOP: f64 = 10.0;

const TAP_SLOP_SQUARED: f64 = TAP_SLOP * TAP_SLOP;

/// A candidate tap: a touch press that may become a click on release.
#[derive(Clone, Debug)]
pub struct TapState<K> {
    /// The object pressed on.
    pub target: K,
    /// Where the press landed.
    pub position: Point,
    /// When the press happened.
    pub start_ms: u64,
    /// Set when this press chained within the double-click window of the
    /// previous tap; a qualifying release then also fires a double click.
    pub is_double: bool,
}

impl<K: Copy + PartialEq> TapState<K> {
    /// Begins a tap, chaining off `previous` for double-click detection.
    #[must_use]
    pub fn begin(target: K, position: Point, now_ms: u64, previous: Option<&Self>) -> Self {
        let is_double =
            previous.is_some_and(|tap| now_ms.saturating_sub(tap.start_ms) < TAP_WINDOW_MS);
        Self {
            target,
            position,
            start_ms: now_ms,
            is_double,
        }
    }

    /// Returns `true` when a release on `target` at `now_ms` completes
    /// this tap as a click.
    #[must_use]
    pub fn qualifies(&self, target: K, now_ms: u64) -> bool {
        self.target == target && now_ms.saturating_sub(self.start_ms) < TAP_WINDOW_MS
    }

    /// Returns `true` when motion to `position` has travelled beyond the
    /// slop threshold, invalidating the tap.
    #[must_use]
    pub fn exceeded_slop(&self, position: Point) -> bool {
        self.position.distance_squared(position) > TAP_SLOP_SQUARED
    }
}

/// An active drag: captured at press time, reported lazily.
///
/// The press builds (but does not fire) the drag-start event; the first
/// real motion afterwards fires it, and later motions fire plain drags.
#[derive(Clone, Debug)]
pub struct DragGesture<K> {
    /// The object being dragged.
    pub dragged: K,
    /// The captured press-time event, fired as the drag start.
    pub start_event: Event<K>,
    /// Whether the drag start has fired yet.
    pub start_fired: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tap_is_not_double() {
        let tap = TapState::begin(1_u32, Point::new(100.0, 100.0), 1000, None);
        assert!(!tap.is_double);
    }

    #[test]
    fn chained_tap_within_window_is_double() {
        let first = TapState::begin(1_u32, Point::new(100.0, 100.0), 1000, None);
        let second = TapState::begin(1, Point::new(100.0, 100.0), 1250, Some(&first));
        assert!(second.is_double);

        let late = TapState::begin(1, Point::new(100.0, 100.0), 1300, Some(&first));
        assert!(!late.is_double, "window is strict");
    }

    #[test]
    fn release_qualifies_within_window_on_same_target() {
        let tap = TapState::begin(1_u32, Point::new(100.0, 100.0), 1000, None);
        assert!(tap.qualifies(1, 1150));
        assert!(!tap.qualifies(2, 1150), "different target");
        assert!(!tap.qualifies(1, 1300), "too slow");
    }

    #[test]
    fn slop_threshold_is_ten_pixels() {
        let tap = TapState::begin(1_u32, Point::new(100.0, 100.0), 0, None);
        assert!(!tap.exceeded_slop(Point::new(102.0, 101.0)));
        assert!(!tap.exceeded_slop(Point::new(106.0, 108.0)));
        assert!(tap.exceeded_slop(Point::new(100.0, 130.0)));
        assert!(tap.exceeded_slop(Point::new(110.1, 100.0)));
    }
}
