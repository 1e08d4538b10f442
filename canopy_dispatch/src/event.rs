// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canonical event kinds and the synthetic event value.

use glam::Vec3;
use kurbo::Point;

/// The canonical pointer event types.
///
/// Native input maps onto these before dispatch (`touchstart` becomes
/// [`MouseDown`](Self::MouseDown), `touchend`/`touchcancel` become
/// [`MouseUp`](Self::MouseUp)); gesture recognition synthesizes the rest.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum EventKind {
    /// Primary press on a target.
    MouseDown,
    /// Primary release on a target.
    MouseUp,
    /// Pointer moved while over a target.
    MouseMove,
    /// Pointer entered a target.
    MouseOver,
    /// Pointer left a target.
    MouseOut,
    /// Press/release (or recognized tap) on one target.
    Click,
    /// Second click within the double-click window.
    DblClick,
    /// Scroll wheel over a target.
    Wheel,
    /// A drag began (first motion after a qualifying press).
    DragStart,
    /// Motion while dragging, on the dragged object.
    Drag,
    /// Pointer entered a target while dragging.
    DragEnter,
    /// Pointer left a target while dragging.
    DragLeave,
    /// Pointer moved over a target while dragging.
    DragOver,
    /// The drag finished, on the dragged object.
    DragEnd,
    /// A drag released over this target.
    Drop,
}

impl EventKind {
    /// Number of kinds; sizes the registry's per-kind tables.
    pub const COUNT: usize = 15;

    /// Every kind, in `index()` order.
    pub const ALL: &'static [Self] = &[
        Self::MouseDown,
        Self::MouseUp,
        Self::MouseMove,
        Self::MouseOver,
        Self::MouseOut,
        Self::Click,
        Self::DblClick,
        Self::Wheel,
        Self::DragStart,
        Self::Drag,
        Self::DragEnter,
        Self::DragLeave,
        Self::DragOver,
        Self::DragEnd,
        Self::Drop,
    ];

    /// Kinds recomputed hover would dispatch. When nothing listens for any
    /// of these, hover recomputation can be skipped wholesale.
    pub const HOVER: &'static [Self] = &[
        Self::MouseOver,
        Self::MouseOut,
        Self::MouseMove,
        Self::DragEnter,
        Self::DragLeave,
        Self::DragOver,
    ];

    /// Kinds that make a target tap-recognizable.
    pub const CLICK: &'static [Self] = &[Self::Click, Self::DblClick];

    /// Dense index for per-kind tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Hit metadata attached to events that resolved through the picker.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitMeta {
    /// Distance along the pick ray.
    pub distance: f32,
    /// World-space intersection point.
    pub point: Vec3,
}

/// The synthetic event delivered to handlers.
///
/// One normalized shape for mouse, touch, and ray input. `target` is the
/// object the event resolved to and never changes during dispatch;
/// `current_target` is the node whose handlers are currently running.
/// The two control flags are only ever set by the explicit calls below,
/// never implicitly.
#[derive(Clone, Debug)]
pub struct Event<K> {
    /// What happened.
    pub kind: EventKind,
    /// The resolution target; fixed for the whole dispatch.
    pub target: K,
    /// The node currently receiving the event.
    pub current_target: K,
    /// The other side of an over/out transition, when there is one.
    pub related_target: Option<K>,
    /// Normalized client coordinates. For touch input this is the single
    /// active (or changed) touch point; absent for ray-only input.
    pub position: Option<Point>,
    /// Pick metadata when the event resolved through a hit test.
    pub hit: Option<HitMeta>,
    /// Event time in milliseconds, from the input source's clock.
    pub timestamp_ms: u64,
    propagation_stopped: bool,
    default_prevented: bool,
}

impl<K: Copy> Event<K> {
    /// Creates an event targeted at `target`.
    #[must_use]
    pub fn new(kind: EventKind, target: K, timestamp_ms: u64) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            related_target: None,
            position: None,
            hit: None,
            timestamp_ms,
            propagation_stopped: false,
            default_prevented: false,
        }
    }

    /// Attaches client coordinates.
    #[must_use]
    pub fn with_position(mut self, position: Option<Point>) -> Self {
        self.position = position;
        self
    }

    /// Attaches pick metadata.
    #[must_use]
    pub fn with_hit(mut self, hit: HitMeta) -> Self {
        self.hit = Some(hit);
        self
    }

    /// Records the other endpoint of an over/out transition.
    #[must_use]
    pub fn with_related(mut self, related: K) -> Self {
        self.related_target = Some(related);
        self
    }

    /// Stops the bubbling walk after the current node's handlers finish.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Returns `true` once a handler has stopped propagation.
    #[must_use]
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Asks the embedder to suppress the native default action.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Returns `true` once a handler has prevented the default action.
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}
