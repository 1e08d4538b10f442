// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The sphere octree and its batched mutation surface.

use alloc::boxed::Box;
use core::fmt::Debug;
use core::hash::Hash;
use core::mem;

use glam::Vec3;
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::pending::PendingChanges;
use crate::types::{Aabb3, Ray, Sphere};

/// Cells split once they hold more than this many spheres.
const SPLIT_THRESHOLD: usize = 8;

/// Subdivision stops at this depth; crowded leaves stay linear past it.
const MAX_DEPTH: u8 = 10;

/// One octree cell. Spheres live in the deepest cell that fully contains
/// them, so every stored key appears in exactly one cell.
#[derive(Debug)]
struct Cell<K> {
    bounds: Aabb3,
    depth: u8,
    /// Spheres in this subtree, including descendants.
    occupancy: usize,
    items: SmallVec<[(K, Sphere); 4]>,
    children: Option<Box<[Cell<K>; 8]>>,
}

impl<K: Copy + Eq> Cell<K> {
    fn new(bounds: Aabb3, depth: u8) -> Self {
        Self {
            bounds,
            depth,
            occupancy: 0,
            items: SmallVec::new(),
            children: None,
        }
    }

    /// The child that fully contains `sphere`, if this cell is subdivided.
    ///
    /// Both insertion and removal walk with this, so a sphere's cell is a
    /// deterministic function of the tree shape and the sphere itself.
    fn child_for(&mut self, sphere: &Sphere) -> Option<&mut Self> {
        let i = self.bounds.octant_index(sphere.center);
        let children = self.children.as_deref_mut()?;
        if children[i].bounds.contains_sphere(sphere) {
            Some(&mut children[i])
        } else {
            None
        }
    }

    fn insert(&mut self, key: K, sphere: Sphere) {
        self.occupancy += 1;
        if let Some(child) = self.child_for(&sphere) {
            child.insert(key, sphere);
            return;
        }
        self.items.push((key, sphere));
        self.maybe_split();
    }

    fn remove(&mut self, key: &K, sphere: &Sphere) -> bool {
        let removed = if let Some(child) = self.child_for(sphere) {
            child.remove(key, sphere)
        } else if let Some(pos) = self.items.iter().position(|(k, _)| k == key) {
            // Order-preserving removal keeps repeated query order stable.
            self.items.remove(pos);
            true
        } else {
            false
        };
        if removed {
            self.occupancy -= 1;
        }
        removed
    }

    fn maybe_split(&mut self) {
        if self.children.is_some() || self.items.len() <= SPLIT_THRESHOLD || self.depth >= MAX_DEPTH
        {
            return;
        }
        let bounds = self.bounds;
        let depth = self.depth + 1;
        self.children = Some(Box::new(core::array::from_fn(|i| {
            Self::new(bounds.octant(i), depth)
        })));
        // Redistribute: items that fit a child sink, straddlers stay here.
        // Occupancy is unchanged; the subtree still holds the same keys.
        let items = mem::take(&mut self.items);
        for (key, sphere) in items {
            if let Some(child) = self.child_for(&sphere) {
                child.insert(key, sphere);
            } else {
                self.items.push((key, sphere));
            }
        }
    }

    fn query<F: FnMut(K, &Sphere)>(&self, ray: &Ray, visit: &mut F) {
        if self.occupancy == 0 || self.bounds.ray_entry(ray).is_none() {
            return;
        }
        // Straddlers first: they are the large spheres most likely to be
        // near the origin, then children in ray order.
        for (key, sphere) in &self.items {
            if sphere.intersects_ray(ray) {
                visit(*key, sphere);
            }
        }
        let Some(children) = self.children.as_deref() else {
            return;
        };
        let mut order: SmallVec<[(f32, usize); 8]> = children
            .iter()
            .enumerate()
            .filter_map(|(i, c)| {
                if c.occupancy == 0 {
                    return None;
                }
                c.bounds.ray_entry(ray).map(|t| (t, i))
            })
            .collect();
        order.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
        for (_, i) in order {
            children[i].query(ray, visit);
        }
    }
}

/// A spatial index of bounding spheres keyed by `K`.
///
/// Mutations are queued with [`mark_put`](Self::mark_put) and
/// [`mark_remove`](Self::mark_remove) and applied by
/// [`commit`](Self::commit); queries reflect the state as of the last
/// commit. See the crate docs for the batching contract.
#[derive(Debug)]
pub struct SphereIndex<K>
where
    K: Copy + Eq + Hash + Debug,
{
    root: Option<Cell<K>>,
    entries: HashMap<K, Sphere>,
    pending: PendingChanges<K>,
}

impl<K> Default for SphereIndex<K>
where
    K: Copy + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> SphereIndex<K>
where
    K: Copy + Eq + Hash + Debug,
{
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: None,
            entries: HashMap::new(),
            pending: PendingChanges::new(),
        }
    }

    /// Queues `key` for insertion or bounds refresh at the next commit.
    pub fn mark_put(&mut self, key: K) {
        self.pending.mark_put(key);
    }

    /// Queues `key` for removal at the next commit.
    ///
    /// Removal wins over a put for the same key within one batch, and is
    /// idempotent: removing an unknown key is a no-op.
    pub fn mark_remove(&mut self, key: K) {
        self.pending.mark_remove(key);
    }

    /// Returns `true` if a changeset is waiting to be committed.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Applies the pending changeset exactly once.
    ///
    /// Each surviving put resolves the key's current sphere through
    /// `resolve`; `None` means the object is gone or has no bounds any
    /// more, and the put downgrades to a remove.
    pub fn commit(&mut self, mut resolve: impl FnMut(K) -> Option<Sphere>) {
        if self.pending.is_empty() {
            return;
        }
        let (removals, puts) = self.pending.take();
        for key in removals {
            self.remove_now(key);
        }
        for key in puts {
            match resolve(key) {
                Some(sphere) => self.upsert_now(key, sphere),
                None => self.remove_now(key),
            }
        }
    }

    /// Visits every stored sphere intersecting `ray` exactly once, biased
    /// near-to-far. Reflects the state as of the last [`commit`](Self::commit).
    pub fn query_ray<F: FnMut(K, &Sphere)>(&self, ray: &Ray, mut visit: F) {
        if let Some(root) = &self.root {
            root.query(ray, &mut visit);
        }
    }

    /// The committed sphere for `key`, if present.
    #[must_use]
    pub fn sphere(&self, key: &K) -> Option<&Sphere> {
        self.entries.get(key)
    }

    /// Returns `true` if `key` is present in the committed index.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of committed spheres.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the committed index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops all entries and any pending changeset.
    pub fn clear(&mut self) {
        self.root = None;
        self.entries.clear();
        self.pending.clear();
    }

    fn upsert_now(&mut self, key: K, sphere: Sphere) {
        if let Some(old) = self.entries.insert(key, sphere) {
            if let Some(root) = &mut self.root {
                root.remove(&key, &old);
            }
        }
        self.ensure_root_contains(&sphere);
        if let Some(root) = &mut self.root {
            root.insert(key, sphere);
        }
    }

    fn remove_now(&mut self, key: K) {
        let Some(sphere) = self.entries.remove(&key) else {
            return;
        };
        if let Some(root) = &mut self.root {
            root.remove(&key, &sphere);
        }
    }

    /// Establishes the root cell, doubling it away from `sphere` until the
    /// sphere fits. The old root is grafted in as one octant of each grown
    /// root, so existing placements stay valid.
    fn ensure_root_contains(&mut self, sphere: &Sphere) {
        let root = self.root.get_or_insert_with(|| {
            let half = Vec3::splat(sphere.radius.max(0.5) * 4.0);
            Cell::new(Aabb3::from_center_half(sphere.center, half), 0)
        });
        while !root.bounds.contains_sphere(sphere) {
            let toward = sphere.center - root.bounds.center();
            let signs = Vec3::new(
                if toward.x >= 0.0 { 1.0 } else { -1.0 },
                if toward.y >= 0.0 { 1.0 } else { -1.0 },
                if toward.z >= 0.0 { 1.0 } else { -1.0 },
            );
            let old_half = root.bounds.half_extent();
            let new_bounds =
                Aabb3::from_center_half(root.bounds.center() + signs * old_half, old_half * 2.0);
            let old = mem::replace(root, Cell::new(new_bounds, 0));
            let slot = new_bounds.octant_index(old.bounds.center());
            root.occupancy = old.occupancy;
            let mut children: Box<[Cell<K>; 8]> =
                Box::new(core::array::from_fn(|i| Cell::new(new_bounds.octant(i), 1)));
            children[slot] = old;
            root.children = Some(children);
        }
    }
}
