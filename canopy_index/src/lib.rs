// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Index: a bounding-sphere octree with batched changesets.
//!
//! This crate maintains a spatial index over the bounding spheres of
//! application objects, keyed by a small copyable key type. It is the
//! pre-filtering stage of a ray picker: [`SphereIndex::query_ray`] visits
//! every stored sphere a ray intersects, in an order biased near-to-far, so
//! callers can collect candidates for exact geometry tests.
//!
//! ## Batched mutation
//!
//! Structural changes are not applied immediately. Object lifecycle
//! notifications call [`SphereIndex::mark_put`] and
//! [`SphereIndex::mark_remove`], which accumulate a pending changeset;
//! [`SphereIndex::commit`] applies the whole batch transactionally,
//! resolving each marked key's *current* sphere through a caller-supplied
//! lookup. A key marked both put and removed in one batch is treated as
//! removed, and a put whose sphere can no longer be resolved is downgraded
//! to a remove. This keeps per-frame bounds churn O(changed) instead of
//! restructuring the tree on every notification.
//!
//! ```
//! use canopy_index::{Ray, Sphere, SphereIndex};
//! use glam::Vec3;
//!
//! let mut index = SphereIndex::new();
//! index.mark_put(1_u32);
//! index.mark_put(2_u32);
//! index.commit(|key| match key {
//!     1 => Some(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0)),
//!     2 => Some(Sphere::new(Vec3::new(10.0, 0.0, -5.0), 1.0)),
//!     _ => None,
//! });
//!
//! let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
//! let mut seen = Vec::new();
//! index.query_ray(&ray, |key, _sphere| seen.push(key));
//! assert_eq!(seen, vec![1]);
//! ```
//!
//! ## Guarantees
//!
//! - Every sphere intersecting the query ray is visited at least once.
//! - No key is visited more than once per query.
//! - Removing a key then querying never yields that key.
//!
//! The traversal order is a heuristic (cells are descended by ascending ray
//! entry distance); callers needing a total order must sort the collected
//! candidates themselves.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod octree;
mod pending;
mod types;

pub use octree::SphereIndex;
pub use pending::PendingChanges;
pub use types::{Aabb3, Eye, Ray, Sphere};
