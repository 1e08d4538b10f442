// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen-point to world-ray derivation.

use canopy_index::{Eye, Ray};
use glam::{Mat4, Vec3};
use kurbo::{Point, Rect};

/// Anything that can turn a screen-space point into a world-space ray.
///
/// Implemented by the rendering layer; VR-style input that already carries
/// a world ray bypasses this entirely.
pub trait RaySource {
    /// Derives the world ray passing through `point` within `viewport`, or
    /// `None` when no ray exists (degenerate viewport or camera).
    fn ray_at(&self, point: Point, viewport: Rect) -> Option<Ray>;
}

/// A camera described by its view and projection matrices.
///
/// Unprojects screen points through the inverse projection and view
/// transforms: screen → NDC → eye space → world space. The ray origin is
/// the camera position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MatrixCamera {
    /// World-to-view transform.
    pub view: Mat4,
    /// View-to-clip transform.
    pub projection: Mat4,
    /// Tag derived rays with a stereo eye.
    pub eye: Option<Eye>,
}

impl MatrixCamera {
    /// Creates a camera from view and projection matrices.
    #[must_use]
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self {
            view,
            projection,
            eye: None,
        }
    }

    /// Tags every derived ray with `eye` (for per-eye stereo picking).
    #[must_use]
    pub fn with_eye(mut self, eye: Eye) -> Self {
        self.eye = Some(eye);
        self
    }
}

impl RaySource for MatrixCamera {
    fn ray_at(&self, point: Point, viewport: Rect) -> Option<Ray> {
        if viewport.width() <= 0.0 || viewport.height() <= 0.0 {
            return None;
        }
        let ndc_x = 2.0 * (point.x - viewport.x0) / viewport.width() - 1.0;
        let ndc_y = 1.0 - 2.0 * (point.y - viewport.y0) / viewport.height();

        // Unproject a point on the near plane into eye space, then treat it
        // as a direction; only the direction matters, so the perspective
        // divide's scale is irrelevant.
        let clip = Vec3::new(ndc_x as f32, ndc_y as f32, -1.0);
        let eye_point = self.projection.inverse().project_point3(clip);
        let eye_dir = Vec3::new(eye_point.x, eye_point.y, -1.0);

        let inv_view = self.view.inverse();
        let direction = inv_view.transform_vector3(eye_dir).normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        let origin = inv_view.transform_point3(Vec3::ZERO);
        let ray = Ray::new(origin, direction);
        Some(match self.eye {
            Some(eye) => ray.with_eye(eye),
            None => ray,
        })
    }
}
