// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Hit: ray picking over a [`canopy_index`] sphere index.
//!
//! The picker turns a world-space ray (or a screen point plus a camera) into
//! a deterministically ordered list of exact hits:
//!
//! 1. Commit the index's pending changeset, resolving spheres through the
//!    scene.
//! 2. Traverse the index for candidate keys whose bounding sphere the ray
//!    intersects.
//! 3. Ask the scene for the exact geometry intersection of each live
//!    candidate, keeping the first (closest) hit per key.
//! 4. Sort ascending by `(distance, bias)` — the bias is a per-object
//!    tie-break that scenes use to layer coincident geometry.
//!
//! Target selection is separate from picking: [`pick_target`] returns the
//! first hit satisfying an eligibility predicate, so non-interactive
//! geometry still occludes what is behind it without being selectable.
//!
//! The scene is consumed through the narrow [`PickScene`] trait; this crate
//! never owns or mutates scene objects.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod camera;
mod pick;
mod scene;

pub use camera::{MatrixCamera, RaySource};
pub use pick::{RayHit, pick_along_ray, pick_at_point, pick_target};
pub use scene::{GeomHit, PickScene, PointerPolicy};
