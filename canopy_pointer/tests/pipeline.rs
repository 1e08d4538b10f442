// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end pipeline tests: hover transitions, tap recognition, drag
//! round-trips, bubbling, and policy handling over a real scene.

use std::cell::RefCell;
use std::rc::Rc;

use canopy_dispatch::EventKind;
use canopy_hit::{GeomHit, PickScene, PointerPolicy, RaySource};
use canopy_index::{Ray, Sphere};
use canopy_pointer::{
    MouseAction, PointerButtons, PointerPipeline, PointerSample, RawPointer, SampleAction,
    TouchPhase,
};
use glam::Vec3;
use hashbrown::HashMap;
use kurbo::{Point, Rect};
use smallvec::smallvec;

// ---- scene scaffolding -----------------------------------------------

#[derive(Clone)]
struct Obj {
    sphere: Option<Sphere>,
    parent: Option<u32>,
    policy: PointerPolicy,
    draggable: bool,
}

#[derive(Default)]
struct TestScene {
    objects: HashMap<u32, Obj>,
}

impl TestScene {
    fn add(&mut self, key: u32, center: (f32, f32, f32), radius: f32) -> &mut Obj {
        self.objects.insert(
            key,
            Obj {
                sphere: Some(Sphere::new(
                    Vec3::new(center.0, center.1, center.2),
                    radius,
                )),
                parent: None,
                policy: PointerPolicy::Auto,
                draggable: false,
            },
        );
        self.objects.get_mut(&key).expect("just inserted")
    }

    /// A bubbling-only node: participates in dispatch, never in picking.
    fn add_group(&mut self, key: u32) {
        self.objects.insert(
            key,
            Obj {
                sphere: None,
                parent: None,
                policy: PointerPolicy::Auto,
                draggable: false,
            },
        );
    }
}

impl PickScene for TestScene {
    type Key = u32;

    fn contains(&self, key: u32) -> bool {
        self.objects.contains_key(&key)
    }

    fn bounding_sphere(&self, key: u32) -> Option<Sphere> {
        self.objects.get(&key).and_then(|o| o.sphere)
    }

    fn intersect_ray(&self, key: u32, ray: &Ray) -> Option<GeomHit> {
        let sphere = self.objects.get(&key)?.sphere?;
        if !sphere.intersects_ray(ray) {
            return None;
        }
        let to_center = sphere.center - ray.origin;
        let t_ca = to_center.dot(ray.direction);
        let d2 = to_center.length_squared() - t_ca * t_ca;
        let distance = t_ca - (sphere.radius * sphere.radius - d2).max(0.0).sqrt();
        Some(GeomHit {
            distance,
            point: ray.at(distance),
        })
    }

    fn pointer_policy(&self, key: u32) -> PointerPolicy {
        self.objects.get(&key).map_or(PointerPolicy::Auto, |o| o.policy)
    }

    fn parent(&self, key: u32) -> Option<u32> {
        self.objects.get(&key).and_then(|o| o.parent)
    }

    fn draggable(&self, key: u32) -> bool {
        self.objects.get(&key).is_some_and(|o| o.draggable)
    }
}

/// Orthographic screen-space camera: a screen point becomes a ray straight
/// down -z from (x, y, 0), so scene coordinates read like screen pixels.
struct FlatCamera;

impl RaySource for FlatCamera {
    fn ray_at(&self, point: Point, _viewport: Rect) -> Option<Ray> {
        Some(Ray::new(
            Vec3::new(point.x as f32, point.y as f32, 0.0),
            Vec3::new(0.0, 0.0, -1.0),
        ))
    }
}

type Log = Rc<RefCell<Vec<(EventKind, u32, u32)>>>;

struct Harness {
    scene: TestScene,
    pipeline: PointerPipeline<u32>,
    log: Log,
}

impl Harness {
    fn new() -> Self {
        Self {
            scene: TestScene::default(),
            pipeline: PointerPipeline::new(Rect::new(0.0, 0.0, 800.0, 600.0)),
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Registers a logging listener recording (kind, current_target, target).
    fn listen(&mut self, key: u32, kind: EventKind) {
        let log = Rc::clone(&self.log);
        self.pipeline.add_listener(key, kind, move |event| {
            log.borrow_mut()
                .push((event.kind, event.current_target, event.target));
        });
    }

    fn taken(&self) -> Vec<(EventKind, u32, u32)> {
        self.log.borrow_mut().drain(..).collect()
    }

    fn mouse_move(&mut self, x: f64, y: f64, ts: u64) {
        let raw = RawPointer::Mouse {
            action: MouseAction::Move,
            position: Point::new(x, y),
            buttons: PointerButtons::empty(),
            timestamp_ms: ts,
        };
        self.pipeline.process(&self.scene, &FlatCamera, &raw);
    }

    fn mouse_down(&mut self, x: f64, y: f64, ts: u64) -> bool {
        let raw = RawPointer::Mouse {
            action: MouseAction::Down,
            position: Point::new(x, y),
            buttons: PointerButtons::PRIMARY,
            timestamp_ms: ts,
        };
        self.pipeline.process(&self.scene, &FlatCamera, &raw)
    }

    fn mouse_click(&mut self, x: f64, y: f64, ts: u64) -> bool {
        let raw = RawPointer::Mouse {
            action: MouseAction::Click,
            position: Point::new(x, y),
            buttons: PointerButtons::empty(),
            timestamp_ms: ts,
        };
        self.pipeline.process(&self.scene, &FlatCamera, &raw)
    }

    fn touch_start(&mut self, x: f64, y: f64, ts: u64) -> bool {
        let raw = RawPointer::Touch {
            phase: TouchPhase::Start,
            touches: smallvec![Point::new(x, y)],
            changed: smallvec![Point::new(x, y)],
            timestamp_ms: ts,
        };
        self.pipeline.process(&self.scene, &FlatCamera, &raw)
    }

    fn touch_move(&mut self, x: f64, y: f64, ts: u64) {
        let raw = RawPointer::Touch {
            phase: TouchPhase::Move,
            touches: smallvec![Point::new(x, y)],
            changed: smallvec![Point::new(x, y)],
            timestamp_ms: ts,
        };
        self.pipeline.process(&self.scene, &FlatCamera, &raw);
    }

    fn touch_end(&mut self, x: f64, y: f64, ts: u64) -> bool {
        let raw = RawPointer::Touch {
            phase: TouchPhase::End,
            touches: smallvec![],
            changed: smallvec![Point::new(x, y)],
            timestamp_ms: ts,
        };
        self.pipeline.process(&self.scene, &FlatCamera, &raw)
    }

    fn release_drag(&mut self, x: f64, y: f64, ts: u64, on_surface: bool) {
        let sample = PointerSample {
            position: Some(Point::new(x, y)),
            ray: None,
            action: Some(SampleAction::Release),
            active_touches: 0,
            changed_touches: 0,
            from_touch: false,
            buttons: PointerButtons::empty(),
            timestamp_ms: ts,
        };
        self.pipeline
            .release_while_dragging(&self.scene, &FlatCamera, &sample, on_surface);
    }
}

// ---- hover ------------------------------------------------------------

#[test]
fn hover_enter_fires_over_chain_and_no_out() {
    let mut h = Harness::new();
    h.scene.add_group(1);
    h.scene.add(2, (100.0, 100.0, -5.0), 10.0).parent = Some(1);
    h.pipeline.object_added(2);
    for key in [1, 2] {
        h.listen(key, EventKind::MouseOver);
        h.listen(key, EventKind::MouseOut);
    }

    // From empty space onto the object.
    h.mouse_move(400.0, 400.0, 0);
    assert!(h.taken().is_empty(), "missing everything fires nothing");

    h.mouse_move(100.0, 100.0, 16);
    assert_eq!(
        h.taken(),
        vec![
            (EventKind::MouseOver, 2, 2),
            (EventKind::MouseOver, 1, 2),
        ],
        "exactly one over per node, bubbling child-to-parent, zero outs"
    );
}

#[test]
fn hover_switch_fires_full_out_chain_before_over_chain() {
    let mut h = Harness::new();
    h.scene.add_group(1);
    h.scene.add(2, (100.0, 100.0, -5.0), 10.0).parent = Some(1);
    h.scene.add_group(3);
    h.scene.add(4, (300.0, 100.0, -5.0), 10.0).parent = Some(3);
    h.pipeline.object_added(2);
    h.pipeline.object_added(4);
    for key in [1, 2, 3, 4] {
        h.listen(key, EventKind::MouseOver);
        h.listen(key, EventKind::MouseOut);
    }

    h.mouse_move(100.0, 100.0, 0);
    h.taken();
    h.mouse_move(300.0, 100.0, 16);
    assert_eq!(
        h.taken(),
        vec![
            (EventKind::MouseOut, 2, 2),
            (EventKind::MouseOut, 1, 2),
            (EventKind::MouseOver, 4, 4),
            (EventKind::MouseOver, 3, 4),
        ],
        "the old chain finishes before the new chain starts"
    );
}

#[test]
fn stationary_target_receives_mousemove() {
    let mut h = Harness::new();
    h.scene.add(1, (100.0, 100.0, -5.0), 10.0);
    h.pipeline.object_added(1);
    h.listen(1, EventKind::MouseMove);

    h.mouse_move(100.0, 100.0, 0);
    h.mouse_move(102.0, 100.0, 16);
    assert_eq!(
        h.taken(),
        vec![
            (EventKind::MouseMove, 1, 1),
            (EventKind::MouseMove, 1, 1),
        ]
    );
}

// ---- taps -------------------------------------------------------------

#[test]
fn tap_within_thresholds_fires_exactly_one_click() {
    let mut h = Harness::new();
    h.scene.add(1, (100.0, 100.0, -5.0), 10.0);
    h.pipeline.object_added(1);
    h.listen(1, EventKind::Click);

    h.touch_start(100.0, 100.0, 1000);
    h.touch_end(102.0, 101.0, 1150);
    assert_eq!(h.taken(), vec![(EventKind::Click, 1, 1)]);
}

#[test]
fn tap_moved_beyond_slop_never_clicks() {
    let mut h = Harness::new();
    h.scene.add(1, (100.0, 100.0, -5.0), 40.0);
    h.pipeline.object_added(1);
    h.listen(1, EventKind::Click);

    h.touch_start(100.0, 100.0, 1000);
    // 30 px of travel: well past the 10 px slop, still on the object and
    // still inside the time window.
    h.touch_move(100.0, 130.0, 1050);
    h.touch_end(100.0, 130.0, 1150);
    assert!(h.taken().is_empty());
}

#[test]
fn slow_release_never_clicks() {
    let mut h = Harness::new();
    h.scene.add(1, (100.0, 100.0, -5.0), 10.0);
    h.pipeline.object_added(1);
    h.listen(1, EventKind::Click);

    h.touch_start(100.0, 100.0, 1000);
    h.touch_end(100.0, 100.0, 1400);
    assert!(h.taken().is_empty(), "300 ms window is strict");
}

#[test]
fn release_on_other_object_never_clicks() {
    let mut h = Harness::new();
    h.scene.add(1, (100.0, 100.0, -5.0), 10.0);
    h.scene.add(2, (300.0, 100.0, -5.0), 10.0);
    h.pipeline.object_added(1);
    h.pipeline.object_added(2);
    h.listen(1, EventKind::Click);
    h.listen(2, EventKind::Click);

    h.touch_start(100.0, 100.0, 1000);
    h.touch_end(300.0, 100.0, 1100);
    assert!(h.taken().is_empty());
}

#[test]
fn second_tap_within_window_also_fires_dblclick() {
    let mut h = Harness::new();
    h.scene.add(1, (100.0, 100.0, -5.0), 10.0);
    h.pipeline.object_added(1);
    h.listen(1, EventKind::Click);
    h.listen(1, EventKind::DblClick);

    h.touch_start(100.0, 100.0, 1000);
    h.touch_end(100.0, 100.0, 1080);
    h.touch_start(100.0, 100.0, 1200);
    h.touch_end(100.0, 100.0, 1280);
    assert_eq!(
        h.taken(),
        vec![
            (EventKind::Click, 1, 1),
            (EventKind::Click, 1, 1),
            (EventKind::DblClick, 1, 1),
        ]
    );
}

#[test]
fn taps_too_far_apart_stay_single_clicks() {
    let mut h = Harness::new();
    h.scene.add(1, (100.0, 100.0, -5.0), 10.0);
    h.pipeline.object_added(1);
    h.listen(1, EventKind::DblClick);

    h.touch_start(100.0, 100.0, 1000);
    h.touch_end(100.0, 100.0, 1080);
    h.touch_start(100.0, 100.0, 1400);
    h.touch_end(100.0, 100.0, 1480);
    assert!(h.taken().is_empty(), "no dblclick across a 400 ms gap");
}

#[test]
fn click_listener_on_ancestor_enables_taps_and_receives_bubble() {
    let mut h = Harness::new();
    h.scene.add_group(1);
    h.scene.add(2, (100.0, 100.0, -5.0), 10.0).parent = Some(1);
    h.pipeline.object_added(2);
    h.listen(1, EventKind::Click);

    h.touch_start(100.0, 100.0, 1000);
    h.touch_end(100.0, 100.0, 1100);
    assert_eq!(
        h.taken(),
        vec![(EventKind::Click, 1, 2)],
        "click targets the child, the parent handles it"
    );
}

// ---- canonical action mapping ------------------------------------------

#[test]
fn touch_actions_map_to_mousedown_and_mouseup() {
    let mut h = Harness::new();
    h.scene.add(1, (100.0, 100.0, -5.0), 10.0);
    h.pipeline.object_added(1);
    h.listen(1, EventKind::MouseDown);
    h.listen(1, EventKind::MouseUp);

    h.touch_start(100.0, 100.0, 0);
    h.touch_end(100.0, 100.0, 50);
    assert_eq!(
        h.taken(),
        vec![
            (EventKind::MouseDown, 1, 1),
            (EventKind::MouseUp, 1, 1),
        ]
    );
}

#[test]
fn touch_end_clears_hover_with_a_trailing_out() {
    let mut h = Harness::new();
    h.scene.add(1, (100.0, 100.0, -5.0), 10.0);
    h.pipeline.object_added(1);
    h.listen(1, EventKind::MouseOver);
    h.listen(1, EventKind::MouseOut);

    h.touch_start(100.0, 100.0, 0);
    assert_eq!(h.taken(), vec![(EventKind::MouseOver, 1, 1)]);
    assert!(h.pipeline.context_menu_suppressed());

    h.touch_end(100.0, 100.0, 50);
    assert_eq!(h.taken(), vec![(EventKind::MouseOut, 1, 1)]);
    assert!(h.pipeline.hovered().is_none());
    assert!(!h.pipeline.context_menu_suppressed());
}

#[test]
fn action_on_a_target_reports_handled() {
    let mut h = Harness::new();
    h.scene.add(1, (100.0, 100.0, -5.0), 10.0);
    h.pipeline.object_added(1);
    h.listen(1, EventKind::MouseDown);

    assert!(h.mouse_down(100.0, 100.0, 0), "hit: suppress the default");
    assert!(!h.mouse_down(500.0, 500.0, 16), "miss: leave it alone");
}

#[test]
fn multi_touch_input_is_ignored_not_an_error() {
    let mut h = Harness::new();
    h.scene.add(1, (100.0, 100.0, -5.0), 10.0);
    h.pipeline.object_added(1);
    h.listen(1, EventKind::MouseDown);
    h.listen(1, EventKind::Click);

    let two_fingers = RawPointer::Touch {
        phase: TouchPhase::Start,
        touches: smallvec![Point::new(100.0, 100.0), Point::new(300.0, 100.0)],
        changed: smallvec![Point::new(300.0, 100.0)],
        timestamp_ms: 0,
    };
    let handled = h.pipeline.process(&h.scene, &FlatCamera, &two_fingers);
    assert!(!handled);
    assert!(h.taken().is_empty());
}

// ---- bubbling control ----------------------------------------------------

#[test]
fn stop_propagation_on_target_blocks_ancestors() {
    let mut h = Harness::new();
    h.scene.add_group(1);
    h.scene.add(2, (100.0, 100.0, -5.0), 10.0).parent = Some(1);
    h.pipeline.object_added(2);

    let log = Rc::clone(&h.log);
    h.pipeline.add_listener(2, EventKind::Click, move |event| {
        log.borrow_mut()
            .push((event.kind, event.current_target, event.target));
        event.stop_propagation();
    });
    h.listen(1, EventKind::Click);

    h.mouse_click(100.0, 100.0, 0);
    assert_eq!(h.taken(), vec![(EventKind::Click, 2, 2)]);
}

// ---- drags ----------------------------------------------------------------

#[test]
fn drag_round_trip() {
    let mut h = Harness::new();
    h.scene.add(1, (100.0, 100.0, -5.0), 10.0).draggable = true;
    h.scene.add(2, (300.0, 100.0, -5.0), 10.0);
    h.pipeline.object_added(1);
    h.pipeline.object_added(2);
    h.listen(1, EventKind::DragStart);
    h.listen(1, EventKind::Drag);
    h.listen(1, EventKind::DragEnd);
    h.listen(2, EventKind::Drop);

    h.mouse_down(100.0, 100.0, 0);
    assert!(h.pipeline.is_dragging());
    assert!(h.pipeline.wants_global_release());
    assert!(h.taken().is_empty(), "drag start is lazy");

    h.mouse_move(120.0, 100.0, 16);
    assert_eq!(h.taken(), vec![(EventKind::DragStart, 1, 1)]);

    h.mouse_move(140.0, 100.0, 32);
    assert_eq!(h.taken(), vec![(EventKind::Drag, 1, 1)]);

    h.release_drag(300.0, 100.0, 48, true);
    assert_eq!(
        h.taken(),
        vec![(EventKind::Drop, 2, 2), (EventKind::DragEnd, 1, 1)],
        "drop on the target, then dragend on the dragged object"
    );
    assert!(!h.pipeline.is_dragging());
    assert!(!h.pipeline.wants_global_release());

    // Drag state is gone: motion fires no drag events.
    h.mouse_move(320.0, 100.0, 64);
    assert!(h.taken().is_empty());
}

#[test]
fn off_surface_release_skips_drop_but_ends_the_drag() {
    let mut h = Harness::new();
    h.scene.add(1, (100.0, 100.0, -5.0), 10.0).draggable = true;
    h.pipeline.object_added(1);
    h.listen(1, EventKind::DragStart);
    h.listen(1, EventKind::Drop);
    h.listen(1, EventKind::DragEnd);

    h.mouse_down(100.0, 100.0, 0);
    h.mouse_move(110.0, 100.0, 16);
    h.taken();

    h.release_drag(100.0, 100.0, 32, false);
    assert_eq!(h.taken(), vec![(EventKind::DragEnd, 1, 1)]);
    assert!(!h.pipeline.is_dragging());
}

#[test]
fn press_release_without_motion_fires_no_drag_start() {
    let mut h = Harness::new();
    h.scene.add(1, (100.0, 100.0, -5.0), 10.0).draggable = true;
    h.pipeline.object_added(1);
    h.listen(1, EventKind::DragStart);
    h.listen(1, EventKind::Drag);
    h.listen(1, EventKind::Drop);
    h.listen(1, EventKind::DragEnd);

    h.mouse_down(100.0, 100.0, 0);
    h.release_drag(100.0, 100.0, 16, true);
    assert_eq!(
        h.taken(),
        vec![(EventKind::Drop, 1, 1), (EventKind::DragEnd, 1, 1)],
        "no dragstart or drag without motion"
    );
}

#[test]
fn dragging_mirrors_hover_with_dragenter_and_dragleave() {
    let mut h = Harness::new();
    h.scene.add(1, (100.0, 100.0, -5.0), 10.0).draggable = true;
    h.scene.add(2, (300.0, 100.0, -5.0), 10.0);
    h.pipeline.object_added(1);
    h.pipeline.object_added(2);
    h.listen(1, EventKind::DragStart);
    h.listen(1, EventKind::DragLeave);
    h.listen(2, EventKind::DragEnter);
    h.listen(2, EventKind::DragOver);

    h.mouse_move(100.0, 100.0, 0);
    h.mouse_down(100.0, 100.0, 16);
    h.mouse_move(100.0, 100.0, 32); // fires the lazy drag start
    h.taken();

    h.mouse_move(300.0, 100.0, 48);
    assert_eq!(
        h.taken(),
        vec![
            (EventKind::DragLeave, 1, 1),
            (EventKind::DragEnter, 2, 2),
            (EventKind::DragOver, 2, 2),
        ]
    );
}

// ---- policies ---------------------------------------------------------------

#[test]
fn never_policy_is_skipped_for_targeting() {
    let mut h = Harness::new();
    // The front object refuses interaction; the one behind accepts it.
    h.scene.add(1, (100.0, 100.0, -3.0), 2.0).policy = PointerPolicy::Never;
    h.scene.add(2, (100.0, 100.0, -8.0), 2.0);
    h.pipeline.object_added(1);
    h.pipeline.object_added(2);
    h.listen(1, EventKind::MouseOver);
    h.listen(2, EventKind::MouseOver);

    h.mouse_move(100.0, 100.0, 0);
    assert_eq!(h.taken(), vec![(EventKind::MouseOver, 2, 2)]);
    assert_eq!(h.pipeline.hovered(), Some(2));
}

#[test]
fn always_policy_needs_no_listener() {
    let mut h = Harness::new();
    h.scene.add(1, (100.0, 100.0, -5.0), 10.0).policy = PointerPolicy::Always;
    h.scene.add(2, (300.0, 100.0, -5.0), 10.0); // Auto, no listeners
    h.pipeline.object_added(1);
    h.pipeline.object_added(2);
    // A hover listener elsewhere keeps the hover gate open without making
    // object 2 eligible.
    h.listen(1, EventKind::MouseOver);

    h.mouse_move(100.0, 100.0, 0);
    assert_eq!(h.pipeline.hovered(), Some(1));

    h.mouse_move(300.0, 100.0, 16);
    assert_eq!(
        h.pipeline.hovered(),
        None,
        "auto policy without listeners is not a target"
    );
}
