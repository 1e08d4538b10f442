// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pick functions: index traversal, exact intersection, two-key ordering.

use alloc::vec::Vec;

use canopy_index::{Ray, SphereIndex};
use glam::Vec3;
use kurbo::{Point, Rect};

use crate::camera::RaySource;
use crate::scene::PickScene;

/// A resolved exact hit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit<K> {
    /// The hit object.
    pub key: K,
    /// Signed distance along the ray.
    pub distance: f32,
    /// Tie-break value; lower sorts first among equal distances.
    pub bias: f32,
    /// World-space intersection point.
    pub point: Vec3,
}

/// Picks every exact hit along `ray`, sorted ascending by
/// `(distance, bias)`.
///
/// Commits the index's pending changeset first, resolving spheres through
/// `scene`, so results always reflect the scene as of the most recent
/// lifecycle notifications. Hits are collected independently of traversal
/// order and sorted stably: equal `(distance, bias)` pairs keep a
/// repeatable order across identical calls.
pub fn pick_along_ray<S: PickScene>(
    index: &mut SphereIndex<S::Key>,
    scene: &S,
    ray: &Ray,
) -> Vec<RayHit<S::Key>> {
    index.commit(|key| scene.bounding_sphere(key));
    let mut hits = Vec::new();
    index.query_ray(ray, |key, _sphere| {
        if !scene.contains(key) {
            return;
        }
        if let Some(geom) = scene.intersect_ray(key, ray) {
            hits.push(RayHit {
                key,
                distance: geom.distance,
                bias: scene.hit_bias(key),
                point: geom.point,
            });
        }
    });
    hits.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then(a.bias.total_cmp(&b.bias))
    });
    hits
}

/// Converts a screen point to a world ray via `camera` and picks along it.
///
/// Returns an empty list when the camera cannot derive a ray (degenerate
/// viewport, point outside a valid frustum).
pub fn pick_at_point<S: PickScene>(
    index: &mut SphereIndex<S::Key>,
    scene: &S,
    camera: &impl RaySource,
    point: Point,
    viewport: Rect,
) -> Vec<RayHit<S::Key>> {
    match camera.ray_at(point, viewport) {
        Some(ray) => pick_along_ray(index, scene, &ray),
        None => Vec::new(),
    }
}

/// The first hit whose key satisfies `eligible`.
///
/// Ineligible hits are skipped, not removed: earlier ineligible geometry
/// has already occluded whatever sorts behind it only in the sense that it
/// occupies an earlier position, which is exactly the semantics wanted for
/// `pointer-events: none`-style objects.
pub fn pick_target<K: Copy>(
    hits: &[RayHit<K>],
    mut eligible: impl FnMut(K) -> bool,
) -> Option<&RayHit<K>> {
    hits.iter().find(|hit| eligible(hit.key))
}
