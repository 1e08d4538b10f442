// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The narrow interface the picker consumes from the external scene graph.

use core::fmt::Debug;
use core::hash::Hash;

use canopy_index::{Ray, Sphere};
use glam::Vec3;

/// An exact geometry intersection reported by the scene.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeomHit {
    /// Signed distance along the ray to the first intersection.
    pub distance: f32,
    /// World-space intersection point.
    pub point: Vec3,
}

/// Whether an object participates in pointer interaction.
///
/// `Auto` defers to listener registration: the object is a valid pointer
/// target only when something listens on it. `Never` objects are skipped
/// during target selection but still occlude objects behind them — blocking
/// without being interactive is a per-object configuration, not a picker
/// policy.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum PointerPolicy {
    /// Interactive iff a relevant listener is registered.
    #[default]
    Auto,
    /// Always a valid pointer target.
    Always,
    /// Never a valid pointer target; still occludes.
    Never,
}

/// Read access to the scene objects participating in hit testing.
///
/// Implementations are expected to tolerate stale keys: every method takes
/// a key that may have been removed from the scene since it was issued, and
/// must answer with the "absent" value (`false`/`None`) rather than panic.
pub trait PickScene {
    /// Stable object identifier.
    type Key: Copy + Eq + Hash + Debug;

    /// Returns `true` while `key` refers to a live object.
    fn contains(&self, key: Self::Key) -> bool;

    /// The object's current world-space bounding sphere, if it has one.
    ///
    /// Objects without a sphere do not participate in spatial indexing.
    fn bounding_sphere(&self, key: Self::Key) -> Option<Sphere>;

    /// Exact ray/geometry intersection; `None` when the ray misses or the
    /// object has no exact-intersection capability.
    ///
    /// Only the first (closest) intersection matters; implementations
    /// should not report interior back-face hits separately.
    fn intersect_ray(&self, key: Self::Key, ray: &Ray) -> Option<GeomHit>;

    /// Tie-break value for hits at identical distance. Defaults to zero.
    fn hit_bias(&self, _key: Self::Key) -> f32 {
        0.0
    }

    /// The object's pointer-interaction policy.
    fn pointer_policy(&self, _key: Self::Key) -> PointerPolicy {
        PointerPolicy::Auto
    }

    /// The object's parent in the bubbling chain, if any.
    fn parent(&self, key: Self::Key) -> Option<Self::Key>;

    /// Returns `true` if pressing on this object may begin a drag.
    fn draggable(&self, _key: Self::Key) -> bool {
        false
    }
}
