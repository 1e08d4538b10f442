// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-surface pointer pipeline.

use core::fmt::Debug;
use core::hash::Hash;

use canopy_dispatch::{Event, EventKind, HitMeta, ListenerRegistry, ListenerToken, bubble};
use canopy_hit::{
    PickScene, PointerPolicy, RayHit, RaySource, pick_along_ray, pick_at_point, pick_target,
};
use canopy_index::SphereIndex;
use kurbo::Rect;

use crate::gesture::{DragGesture, TapState};
use crate::sample::{PointerButtons, PointerSample, RawPointer, SampleAction};

/// Optional pick instrumentation, exposed by
/// [`PointerPipeline::pick_stats`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PickStats {
    /// Number of hit tests performed so far.
    pub picks: u64,
    /// Hits resolved by the most recent pick.
    pub last_hits: usize,
}

/// The pointer pipeline for one rendering surface.
///
/// Owns the spatial index, the listener registry, and the gesture state
/// (hover, drag, tap). Multiple surfaces use independent instances; there
/// is no process-wide state.
///
/// ## Input routing
///
/// Normalize native events with [`PointerSample::from_raw`], then feed
/// motion samples to [`pointer_moved`](Self::pointer_moved) and action
/// samples to [`pointer_action`](Self::pointer_action) (or let
/// [`process`](Self::process) route). While
/// [`wants_global_release`](Self::wants_global_release) is `true`, also
/// forward release events — including ones from outside this surface — to
/// [`release_while_dragging`](Self::release_while_dragging), so drags
/// complete even when the pointer leaves the surface.
///
/// Everything runs synchronously inside the call that delivers the event;
/// the spatial index's pending changes are committed eagerly at the start
/// of each hit test.
#[derive(Debug)]
pub struct PointerPipeline<K>
where
    K: Copy + Eq + Hash + Debug,
{
    index: SphereIndex<K>,
    registry: ListenerRegistry<K>,
    viewport: Rect,
    hovered: Option<K>,
    drag: Option<DragGesture<K>>,
    tap: Option<TapState<K>>,
    context_menu_suppressed: bool,
    stats: PickStats,
}

impl<K> PointerPipeline<K>
where
    K: Copy + Eq + Hash + Debug,
{
    /// Creates a pipeline for a surface spanning `viewport`.
    #[must_use]
    pub fn new(viewport: Rect) -> Self {
        Self {
            index: SphereIndex::new(),
            registry: ListenerRegistry::new(),
            viewport,
            hovered: None,
            drag: None,
            tap: None,
            context_menu_suppressed: false,
            stats: PickStats::default(),
        }
    }

    /// Updates the surface rectangle used for screen-point picking.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// The current surface rectangle.
    #[must_use]
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    // ---- object lifecycle -------------------------------------------------

    /// Notification: an object entered the scene.
    pub fn object_added(&mut self, key: K) {
        self.index.mark_put(key);
    }

    /// Notification: an object's bounds changed.
    ///
    /// Safe to call for objects never added or already removed; the commit
    /// step downgrades unresolvable puts to removals.
    pub fn object_bounds_changed(&mut self, key: K) {
        self.index.mark_put(key);
    }

    /// Notification: an object left the scene.
    ///
    /// Drops the object's listeners and any gesture state referring to it.
    /// Idempotent.
    pub fn object_removed(&mut self, key: K) {
        self.index.mark_remove(key);
        self.registry.remove_all(key);
        if self.hovered == Some(key) {
            self.hovered = None;
        }
        if self.drag.as_ref().is_some_and(|drag| drag.dragged == key) {
            self.drag = None;
        }
        if self.tap.as_ref().is_some_and(|tap| tap.target == key) {
            self.tap = None;
        }
    }

    // ---- listeners --------------------------------------------------------

    /// Registers a handler for `kind` on `key`.
    pub fn add_listener(
        &mut self,
        key: K,
        kind: EventKind,
        handler: impl FnMut(&mut Event<K>) + 'static,
    ) -> ListenerToken {
        self.registry.add(key, kind, handler)
    }

    /// Removes one registration; unknown tokens are ignored.
    pub fn remove_listener(&mut self, key: K, kind: EventKind, token: ListenerToken) {
        self.registry.remove(key, kind, token);
    }

    /// Removes every registration on `key`.
    pub fn remove_all_listeners(&mut self, key: K) {
        self.registry.remove_all(key);
    }

    /// The listener registry, for gating queries.
    #[must_use]
    pub fn registry(&self) -> &ListenerRegistry<K> {
        &self.registry
    }

    // ---- input ------------------------------------------------------------

    /// Normalizes and routes a native event. Returns `true` when the
    /// embedder should suppress the native default action.
    pub fn process<S, C>(&mut self, scene: &S, camera: &C, raw: &RawPointer) -> bool
    where
        S: PickScene<Key = K>,
        C: RaySource,
    {
        let sample = PointerSample::from_raw(raw);
        if sample.is_motion() {
            self.pointer_moved(scene, camera, &sample);
            false
        } else {
            self.pointer_action(scene, camera, &sample)
        }
    }

    /// Handles a motion sample: drag progression, hover transitions, tap
    /// slop cancellation.
    pub fn pointer_moved<S, C>(&mut self, scene: &S, camera: &C, sample: &PointerSample)
    where
        S: PickScene<Key = K>,
        C: RaySource,
    {
        let has_coords = sample.has_coordinates();

        // Touch motion beyond the slop radius invalidates a pending tap:
        // the finger is sliding, not tapping.
        if sample.from_touch && sample.is_motion() {
            if let (Some(tap), Some(position)) = (&self.tap, sample.position) {
                if tap.exceeded_slop(position) {
                    self.tap = None;
                }
            }
        }

        // Drag events ride on real motion only. The first motion after the
        // triggering press fires the captured drag start; later motions
        // fire plain drags.
        if has_coords {
            let step = self.drag.as_mut().map(|drag| {
                if drag.start_fired {
                    (drag.dragged, None)
                } else {
                    drag.start_fired = true;
                    (drag.dragged, Some(drag.start_event.clone()))
                }
            });
            match step {
                Some((_, Some(mut start))) => self.fire(scene, &mut start),
                Some((dragged, None)) => {
                    let mut event = Event::new(EventKind::Drag, dragged, sample.timestamp_ms)
                        .with_position(sample.position);
                    self.fire(scene, &mut event);
                }
                None => {}
            }
        }

        // Hover recomputation is gated: with no hover-class listeners and
        // no active drag, nobody can observe the result.
        if !self.registry.has_any_of(EventKind::HOVER) && self.drag.is_none() {
            return;
        }

        let hit = if has_coords {
            self.resolve(scene, camera, sample)
        } else {
            None
        };
        let next = hit.map(|h| h.key);
        let previous = self.hovered;
        let dragging = self.drag.is_some();
        let ts = sample.timestamp_ms;

        if next != previous {
            // The old target's out events finish bubbling before the new
            // target's over events begin.
            if let Some(old) = previous {
                let mut out =
                    Event::new(EventKind::MouseOut, old, ts).with_position(sample.position);
                out.related_target = next;
                self.fire(scene, &mut out);
                if dragging {
                    let mut leave =
                        Event::new(EventKind::DragLeave, old, ts).with_position(sample.position);
                    leave.related_target = next;
                    self.fire(scene, &mut leave);
                }
            }
            if let Some(new) = next {
                let mut over =
                    Event::new(EventKind::MouseOver, new, ts).with_position(sample.position);
                over.related_target = previous;
                over.hit = hit.map(meta_of);
                self.fire(scene, &mut over);
                if dragging {
                    let mut enter =
                        Event::new(EventKind::DragEnter, new, ts).with_position(sample.position);
                    enter.related_target = previous;
                    enter.hit = hit.map(meta_of);
                    self.fire(scene, &mut enter);
                }
            }
            self.hovered = next;
        }

        if let Some(h) = hit {
            let mut moved = Event::new(EventKind::MouseMove, h.key, ts)
                .with_position(sample.position)
                .with_hit(meta_of(h));
            self.fire(scene, &mut moved);
            if dragging {
                let mut over = Event::new(EventKind::DragOver, h.key, ts)
                    .with_position(sample.position)
                    .with_hit(meta_of(h));
                self.fire(scene, &mut over);
            }
        }
    }

    /// Handles an action sample: canonical dispatch, tap recognition, drag
    /// initiation. Returns `true` when a hit target was resolved — the
    /// embedder should then suppress the native default action
    /// (scrolling, text selection, context menus).
    pub fn pointer_action<S, C>(&mut self, scene: &S, camera: &C, sample: &PointerSample) -> bool
    where
        S: PickScene<Key = K>,
        C: RaySource,
    {
        let Some(action) = sample.action else {
            self.pointer_moved(scene, camera, sample);
            return false;
        };

        // A single-touch start establishes hover first (there is no
        // separate motion stream leading up to it) and suppresses the
        // context menu for the touch session.
        if sample.from_touch && action == SampleAction::Press && sample.active_touches == 1 {
            self.pointer_moved(scene, camera, sample);
            self.context_menu_suppressed = true;
        }

        let hit = self.resolve(scene, camera, sample);
        if let Some(hit) = hit {
            let kind = match action {
                SampleAction::Press => EventKind::MouseDown,
                SampleAction::Release | SampleAction::Cancel => EventKind::MouseUp,
                SampleAction::Click => EventKind::Click,
                SampleAction::Wheel => EventKind::Wheel,
            };
            let mut event = Event::new(kind, hit.key, sample.timestamp_ms)
                .with_position(sample.position)
                .with_hit(meta_of(hit));
            self.fire(scene, &mut event);

            if sample.from_touch {
                match action {
                    SampleAction::Press if sample.active_touches == 1 => {
                        self.maybe_begin_tap(scene, &hit, sample);
                    }
                    SampleAction::Release
                        if sample.active_touches == 0 && sample.changed_touches == 1 =>
                    {
                        self.maybe_finish_tap(scene, &hit, sample);
                    }
                    _ => {}
                }
            }

            let primary_press = action == SampleAction::Press
                && if sample.from_touch {
                    sample.active_touches == 1
                } else {
                    sample.buttons.contains(PointerButtons::PRIMARY)
                };
            if primary_press && self.drag.is_none() && scene.draggable(hit.key) {
                // Capture the drag start now; it fires on the first real
                // motion, so a press-release without movement never drags.
                let start_event = Event::new(EventKind::DragStart, hit.key, sample.timestamp_ms)
                    .with_position(sample.position)
                    .with_hit(meta_of(hit));
                self.drag = Some(DragGesture {
                    dragged: hit.key,
                    start_event,
                    start_fired: false,
                });
            }
        }

        // The last finger lifting re-enables the context menu and clears
        // hover via a trailing coordinate-less motion pass.
        if sample.from_touch
            && matches!(action, SampleAction::Release | SampleAction::Cancel)
            && sample.changed_touches == 1
        {
            self.context_menu_suppressed = false;
            let trailing = PointerSample {
                position: None,
                ray: None,
                action: None,
                ..sample.clone()
            };
            self.pointer_moved(scene, camera, &trailing);
        }

        hit.is_some()
    }

    /// Completes an active drag on a release event.
    ///
    /// Only meaningful while [`wants_global_release`](Self::wants_global_release)
    /// is `true`. The drop target is re-resolved only when the release
    /// originated on this pipeline's surface (`on_surface`); the drag end
    /// always fires on the dragged object, and drag state is cleared
    /// either way.
    pub fn release_while_dragging<S, C>(
        &mut self,
        scene: &S,
        camera: &C,
        sample: &PointerSample,
        on_surface: bool,
    ) where
        S: PickScene<Key = K>,
        C: RaySource,
    {
        let Some(drag) = self.drag.take() else {
            return;
        };
        if on_surface {
            if let Some(hit) = self.resolve(scene, camera, sample) {
                let mut drop = Event::new(EventKind::Drop, hit.key, sample.timestamp_ms)
                    .with_position(sample.position)
                    .with_hit(meta_of(hit));
                self.fire(scene, &mut drop);
            }
        }
        let mut end = Event::new(EventKind::DragEnd, drag.dragged, sample.timestamp_ms)
            .with_position(sample.position);
        self.fire(scene, &mut end);
    }

    // ---- state queries ----------------------------------------------------

    /// The currently hovered object, if any.
    #[must_use]
    pub fn hovered(&self) -> Option<K> {
        self.hovered
    }

    /// Returns `true` while a drag is active.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Returns `true` while release events from outside this surface must
    /// be forwarded to [`release_while_dragging`](Self::release_while_dragging).
    #[must_use]
    pub fn wants_global_release(&self) -> bool {
        self.drag.is_some()
    }

    /// Returns `true` while a touch session suppresses the context menu.
    #[must_use]
    pub fn context_menu_suppressed(&self) -> bool {
        self.context_menu_suppressed
    }

    /// Pick instrumentation counters.
    #[must_use]
    pub fn pick_stats(&self) -> PickStats {
        self.stats
    }

    /// Releases everything: index contents, listeners, gesture state, and
    /// the capture/suppression flags. Idempotent; the only required
    /// cleanup path.
    pub fn teardown(&mut self) {
        self.index.clear();
        self.registry.clear();
        self.hovered = None;
        self.drag = None;
        self.tap = None;
        self.context_menu_suppressed = false;
    }

    // ---- internals ----------------------------------------------------

    fn resolve<S, C>(
        &mut self,
        scene: &S,
        camera: &C,
        sample: &PointerSample,
    ) -> Option<RayHit<K>>
    where
        S: PickScene<Key = K>,
        C: RaySource,
    {
        let hits = if let Some(ray) = &sample.ray {
            pick_along_ray(&mut self.index, scene, ray)
        } else if let Some(position) = sample.position {
            pick_at_point(&mut self.index, scene, camera, position, self.viewport)
        } else {
            return None;
        };
        self.stats.picks += 1;
        self.stats.last_hits = hits.len();
        pick_target(&hits, |key| is_interactive(scene, &self.registry, key)).copied()
    }

    fn fire<S: PickScene<Key = K>>(&self, scene: &S, event: &mut Event<K>) {
        bubble(&self.registry, |key| scene.parent(key), event);
    }

    fn maybe_begin_tap<S: PickScene<Key = K>>(
        &mut self,
        scene: &S,
        hit: &RayHit<K>,
        sample: &PointerSample,
    ) {
        // Only worth tracking when a click could actually be delivered.
        if !listens_on_chain(scene, &self.registry, hit.key, EventKind::CLICK) {
            return;
        }
        let Some(position) = sample.position else {
            return;
        };
        let previous = self.tap.take();
        self.tap = Some(TapState::begin(
            hit.key,
            position,
            sample.timestamp_ms,
            previous.as_ref(),
        ));
    }

    fn maybe_finish_tap<S: PickScene<Key = K>>(
        &mut self,
        scene: &S,
        hit: &RayHit<K>,
        sample: &PointerSample,
    ) {
        let qualifies = self
            .tap
            .as_ref()
            .is_some_and(|tap| tap.qualifies(hit.key, sample.timestamp_ms));
        if !qualifies {
            return;
        }
        let is_double = self.tap.as_ref().is_some_and(|tap| tap.is_double);
        let mut click = Event::new(EventKind::Click, hit.key, sample.timestamp_ms)
            .with_position(sample.position)
            .with_hit(meta_of(*hit));
        self.fire(scene, &mut click);
        if is_double {
            let mut dbl = Event::new(EventKind::DblClick, hit.key, sample.timestamp_ms)
                .with_position(sample.position)
                .with_hit(meta_of(*hit));
            self.fire(scene, &mut dbl);
        }
    }
}

fn meta_of<K>(hit: RayHit<K>) -> HitMeta {
    HitMeta {
        distance: hit.distance,
        point: hit.point,
    }
}

/// Target eligibility: `Always` wins, `Never` loses, `Auto` defers to
/// listener registration on the object or an ancestor.
fn is_interactive<S: PickScene>(
    scene: &S,
    registry: &ListenerRegistry<S::Key>,
    key: S::Key,
) -> bool {
    match scene.pointer_policy(key) {
        PointerPolicy::Always => true,
        PointerPolicy::Never => false,
        PointerPolicy::Auto => listens_on_chain(scene, registry, key, EventKind::ALL),
    }
}

/// Returns `true` if `key` or an ancestor listens for any of `kinds`.
fn listens_on_chain<S: PickScene>(
    scene: &S,
    registry: &ListenerRegistry<S::Key>,
    key: S::Key,
    kinds: &[EventKind],
) -> bool {
    let mut node = Some(key);
    while let Some(current) = node {
        if registry.key_has_any_of(current, kinds) {
            return true;
        }
        node = scene.parent(current);
    }
    false
}
