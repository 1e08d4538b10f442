// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometric primitives: rays, bounding spheres, and axis-aligned boxes.

use glam::Vec3;

/// Which eye a stereo ray was derived for.
///
/// Carried on [`Ray`] for embedders that pick per-eye (for example a stereo
/// VR compositor). The index itself never inspects it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Eye {
    /// The left eye's viewpoint.
    Left,
    /// The right eye's viewpoint.
    Right,
}

/// A ray in world space: origin plus normalized direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    /// World-space origin.
    pub origin: Vec3,
    /// Normalized direction. [`Ray::new`] normalizes for you.
    pub direction: Vec3,
    /// Optional stereo viewpoint tag; opaque to spatial queries.
    pub eye: Option<Eye>,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    ///
    /// A zero direction yields a degenerate ray that intersects nothing.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            eye: None,
        }
    }

    /// Tags the ray with the eye it was derived for.
    #[must_use]
    pub fn with_eye(mut self, eye: Eye) -> Self {
        self.eye = Some(eye);
        self
    }

    /// The point at parameter `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A world-space bounding sphere.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere {
    /// World-space center.
    pub center: Vec3,
    /// Radius; non-negative.
    pub radius: f32,
}

impl Sphere {
    /// Creates a sphere from center and radius.
    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Returns `true` if `ray` intersects this sphere.
    ///
    /// A ray starting inside the sphere intersects it. The test works on
    /// squared distances so it needs no square root.
    #[must_use]
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        let to_center = self.center - ray.origin;
        let r2 = self.radius * self.radius;
        // Origin inside the sphere always counts.
        if to_center.length_squared() <= r2 {
            return true;
        }
        // Closest approach along the ray; negative means the sphere is
        // entirely behind the origin.
        let t_ca = to_center.dot(ray.direction);
        if t_ca < 0.0 {
            return false;
        }
        to_center.length_squared() - t_ca * t_ca <= r2
    }
}

/// An axis-aligned box, used for octree cells.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb3 {
    /// Creates a box from a center point and half-extent per axis.
    #[must_use]
    pub fn from_center_half(center: Vec3, half: Vec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// The center of the box.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half the edge length per axis.
    #[must_use]
    pub fn half_extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Returns `true` if `sphere` lies entirely within the box.
    #[must_use]
    pub fn contains_sphere(&self, sphere: &Sphere) -> bool {
        let r = Vec3::splat(sphere.radius);
        let lo = sphere.center - r;
        let hi = sphere.center + r;
        lo.cmpge(self.min).all() && hi.cmple(self.max).all()
    }

    /// Slab test: the distance at which `ray` enters the box, or `None` on a
    /// miss. An origin inside the box yields `Some(0.0)`.
    #[must_use]
    pub fn ray_entry(&self, ray: &Ray) -> Option<f32> {
        // Zero direction components divide to infinities, which the
        // min/max folding below resolves to the correct slab interval.
        let inv = ray.direction.recip();
        let t0 = (self.min - ray.origin) * inv;
        let t1 = (self.max - ray.origin) * inv;
        let t_near = t0.min(t1);
        let t_far = t0.max(t1);
        let t_min = t_near.max_element();
        let t_max = t_far.min_element();
        if t_max < 0.0 || t_min > t_max {
            return None;
        }
        Some(t_min.max(0.0))
    }

    /// The `i`th octant of this box, `i` in `0..8`.
    ///
    /// Bit 0 selects +x, bit 1 selects +y, bit 2 selects +z.
    #[must_use]
    pub fn octant(&self, i: usize) -> Self {
        let c = self.center();
        let h = self.half_extent() * 0.5;
        let offset = Vec3::new(
            if i & 1 != 0 { h.x } else { -h.x },
            if i & 2 != 0 { h.y } else { -h.y },
            if i & 4 != 0 { h.z } else { -h.z },
        );
        Self::from_center_half(c + offset, h)
    }

    /// Index of the octant whose region contains `point`.
    #[must_use]
    pub fn octant_index(&self, point: Vec3) -> usize {
        let c = self.center();
        usize::from(point.x >= c.x) | usize::from(point.y >= c.y) << 1 | usize::from(point.z >= c.z) << 2
    }
}
