// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input normalization: heterogeneous native input into one sample shape.

use canopy_index::Ray;
use kurbo::Point;
use smallvec::SmallVec;

bitflags::bitflags! {
    /// Pressed pointer buttons.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PointerButtons: u8 {
        /// Left button / touch contact / controller trigger.
        const PRIMARY = 0b0000_0001;
        /// Right button.
        const SECONDARY = 0b0000_0010;
        /// Middle button.
        const MIDDLE = 0b0000_0100;
    }
}

/// What a native mouse event reported.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MouseAction {
    /// Pointer motion with no button change.
    Move,
    /// Button press.
    Down,
    /// Button release.
    Up,
    /// Native click (press + release on the same target).
    Click,
    /// Scroll wheel.
    Wheel,
}

/// Phase of a native touch event.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TouchPhase {
    /// A finger went down.
    Start,
    /// A finger moved.
    Move,
    /// A finger lifted.
    End,
    /// The system cancelled the touch sequence.
    Cancel,
}

/// What a ray-input device (VR controller, gaze) reported.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RayAction {
    /// The ray moved.
    Move,
    /// The trigger was pressed.
    Press,
    /// The trigger was released.
    Release,
}

/// Heterogeneous native input, before normalization.
#[derive(Clone, Debug)]
pub enum RawPointer {
    /// A mouse event.
    Mouse {
        /// What happened.
        action: MouseAction,
        /// Client coordinates.
        position: Point,
        /// Buttons held after the event.
        buttons: PointerButtons,
        /// Event time in milliseconds.
        timestamp_ms: u64,
    },
    /// A touch event.
    Touch {
        /// What happened.
        phase: TouchPhase,
        /// All touch points still on the surface after the event.
        touches: SmallVec<[Point; 2]>,
        /// The touch points that changed in this event.
        changed: SmallVec<[Point; 2]>,
        /// Event time in milliseconds.
        timestamp_ms: u64,
    },
    /// Ray input that already carries a world ray (no camera needed).
    Ray {
        /// The device's world-space ray.
        ray: Ray,
        /// What happened.
        action: RayAction,
        /// Event time in milliseconds.
        timestamp_ms: u64,
    },
}

/// Canonical action classification after normalization.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SampleAction {
    /// A press (`mousedown`, `touchstart`, trigger down).
    Press,
    /// A release (`mouseup`, `touchend`, trigger up).
    Release,
    /// A system-cancelled release (`touchcancel`).
    Cancel,
    /// A native click.
    Click,
    /// A wheel scroll.
    Wheel,
}

/// One normalized input sample.
///
/// Exactly one shape for mouse, touch, and ray input. Motion samples have
/// `action: None`; action samples carry the classification. Multi-touch
/// input normalizes to `position: None` — gestures here are single-touch,
/// so multi-touch is ignored rather than treated as an error.
#[derive(Clone, Debug)]
pub struct PointerSample {
    /// Client coordinates: the mouse position, the single active touch, or
    /// the single changed touch of a touch end. `None` when the sample has
    /// no usable 2D point (ray input, multi-touch, empty touch end).
    pub position: Option<Point>,
    /// World ray for ray-input devices; bypasses camera derivation.
    pub ray: Option<Ray>,
    /// Action classification; `None` for pure motion.
    pub action: Option<SampleAction>,
    /// Touch points remaining on the surface.
    pub active_touches: usize,
    /// Touch points that changed in this event.
    pub changed_touches: usize,
    /// Whether this sample came from a touch device.
    pub from_touch: bool,
    /// Buttons held after the event.
    pub buttons: PointerButtons,
    /// Event time in milliseconds.
    pub timestamp_ms: u64,
}

impl PointerSample {
    /// Normalizes a native event. Total: every raw event has a sample.
    #[must_use]
    pub fn from_raw(raw: &RawPointer) -> Self {
        match raw {
            RawPointer::Mouse {
                action,
                position,
                buttons,
                timestamp_ms,
            } => Self {
                position: Some(*position),
                ray: None,
                action: match action {
                    MouseAction::Move => None,
                    MouseAction::Down => Some(SampleAction::Press),
                    MouseAction::Up => Some(SampleAction::Release),
                    MouseAction::Click => Some(SampleAction::Click),
                    MouseAction::Wheel => Some(SampleAction::Wheel),
                },
                active_touches: 0,
                changed_touches: 0,
                from_touch: false,
                buttons: *buttons,
                timestamp_ms: *timestamp_ms,
            },
            RawPointer::Touch {
                phase,
                touches,
                changed,
                timestamp_ms,
            } => {
                // A single active touch is the pointer; at touch end the
                // lifted (changed) touch stands in so releases can still
                // resolve a target.
                let position = if touches.len() == 1 {
                    Some(touches[0])
                } else if touches.is_empty() && changed.len() == 1 {
                    Some(changed[0])
                } else {
                    None
                };
                Self {
                    position,
                    ray: None,
                    action: match phase {
                        TouchPhase::Start => Some(SampleAction::Press),
                        TouchPhase::Move => None,
                        TouchPhase::End => Some(SampleAction::Release),
                        TouchPhase::Cancel => Some(SampleAction::Cancel),
                    },
                    active_touches: touches.len(),
                    changed_touches: changed.len(),
                    from_touch: true,
                    buttons: if touches.is_empty() {
                        PointerButtons::empty()
                    } else {
                        PointerButtons::PRIMARY
                    },
                    timestamp_ms: *timestamp_ms,
                }
            }
            RawPointer::Ray {
                ray,
                action,
                timestamp_ms,
            } => Self {
                position: None,
                ray: Some(*ray),
                action: match action {
                    RayAction::Move => None,
                    RayAction::Press => Some(SampleAction::Press),
                    RayAction::Release => Some(SampleAction::Release),
                },
                active_touches: 0,
                changed_touches: 0,
                from_touch: false,
                buttons: match action {
                    RayAction::Press => PointerButtons::PRIMARY,
                    _ => PointerButtons::empty(),
                },
                timestamp_ms: *timestamp_ms,
            },
        }
    }

    /// Returns `true` if the sample carries coordinates a pick can use.
    #[must_use]
    pub fn has_coordinates(&self) -> bool {
        self.position.is_some() || self.ray.is_some()
    }

    /// Returns `true` for pure motion samples.
    #[must_use]
    pub fn is_motion(&self) -> bool {
        self.action.is_none()
    }
}
