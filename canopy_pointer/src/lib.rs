// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Pointer: the per-surface pointer pipeline.
//!
//! This crate turns raw input — mouse, single-touch, or a world ray from a
//! controller — into the bubbling synthetic event stream of
//! [`canopy_dispatch`], resolving targets through [`canopy_hit`] over a
//! [`canopy_index`] sphere index. It owns the gesture state machines:
//!
//! - **Hover**: out-before-over transitions as the pointer crosses
//!   objects, with `dragenter`/`dragleave` mirroring during drags.
//! - **Drag**: captured on a primary press over a drag-capable object,
//!   reported lazily on the first real motion, completed by a release
//!   that may arrive from outside the surface.
//! - **Tap**: short touch press/release sequences within 10 px and 300 ms
//!   promote to clicks, chaining into double clicks.
//!
//! One [`PointerPipeline`] per rendering surface; instances share nothing.
//!
//! ```
//! use canopy_dispatch::EventKind;
//! use canopy_hit::{GeomHit, MatrixCamera, PickScene};
//! use canopy_index::{Ray, Sphere};
//! use canopy_pointer::{PointerPipeline, RawPointer, RayAction};
//! use glam::{Mat4, Vec3};
//! use kurbo::Rect;
//!
//! // A scene with one interactive sphere at z = -5.
//! struct Button;
//!
//! impl PickScene for Button {
//!     type Key = u32;
//!     fn contains(&self, key: u32) -> bool {
//!         key == 1
//!     }
//!     fn bounding_sphere(&self, key: u32) -> Option<Sphere> {
//!         (key == 1).then(|| Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0))
//!     }
//!     fn intersect_ray(&self, key: u32, ray: &Ray) -> Option<GeomHit> {
//!         let sphere = self.bounding_sphere(key)?;
//!         sphere.intersects_ray(ray).then(|| GeomHit {
//!             distance: 4.0,
//!             point: ray.at(4.0),
//!         })
//!     }
//!     fn parent(&self, _key: u32) -> Option<u32> {
//!         None
//!     }
//! }
//!
//! let mut pipeline = PointerPipeline::new(Rect::new(0.0, 0.0, 800.0, 600.0));
//! pipeline.object_added(1);
//! pipeline.add_listener(1, EventKind::MouseOver, |event| {
//!     assert_eq!(event.target, 1);
//! });
//!
//! // A controller ray sweeping onto the button.
//! let camera = MatrixCamera::new(Mat4::IDENTITY, Mat4::IDENTITY);
//! let gaze = RawPointer::Ray {
//!     ray: Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)),
//!     action: RayAction::Move,
//!     timestamp_ms: 16,
//! };
//! pipeline.process(&Button, &camera, &gaze);
//! assert_eq!(pipeline.hovered(), Some(1));
//! ```
//!
//! ## Failure semantics
//!
//! Malformed input (multi-touch motion, missing coordinates) resolves to
//! no hit rather than erroring; stale object references no-op. Handler
//! panics are not caught. See the pipeline methods for details.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod gesture;
mod pipeline;
mod sample;

pub use gesture::{DragGesture, TAP_SLOP, TAP_WINDOW_MS, TapState};
pub use pipeline::{PickStats, PointerPipeline};
pub use sample::{
    MouseAction, PointerButtons, PointerSample, RawPointer, RayAction, SampleAction, TouchPhase,
};
