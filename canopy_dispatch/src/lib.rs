// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Dispatch: listener registry, synthetic events, and bubbling.
//!
//! This crate owns the consumer-facing half of pointer interaction:
//!
//! - [`EventKind`]: the closed set of canonical event types.
//! - [`Event`]: the synthetic event handlers receive, with explicit-only
//!   propagation and default-action controls.
//! - [`ListenerRegistry`]: per-kind handler storage with O(1)
//!   "does anything listen for this" gating, used upstream to skip hit
//!   testing nobody would observe.
//! - [`bubble`]: the dispatch walk from target to root.
//!
//! ## Bubbling
//!
//! Dispatch starts at the resolved target and walks the parent chain. At
//! each node every handler registered for the event's kind runs with
//! `current_target` set to that node; `target` never changes. The walk
//! stops once a handler has called [`Event::stop_propagation`] — remaining
//! handlers on the *same* node still run, matching DOM bubbling.
//!
//! ```
//! use canopy_dispatch::{bubble, Event, EventKind, ListenerRegistry};
//!
//! let mut registry: ListenerRegistry<u32> = ListenerRegistry::new();
//! registry.add(2, EventKind::Click, |event| {
//!     assert_eq!(event.target, 3);
//!     assert_eq!(event.current_target, 2);
//! });
//!
//! // Chain: 3 → 2 → 1.
//! let parent = |key: u32| (key > 1).then(|| key - 1);
//! let mut event = Event::new(EventKind::Click, 3, 1000);
//! bubble(&registry, parent, &mut event);
//! ```
//!
//! Handlers are `FnMut(&mut Event<K>)` behind shared handles; a panic in a
//! handler is not caught and aborts the remaining walk, by design. The
//! registry tolerates lookups for keys it has never seen — a node removed
//! mid-walk simply contributes no handlers.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod dispatcher;
mod event;
mod registry;

pub use dispatcher::bubble;
pub use event::{Event, EventKind, HitMeta};
pub use registry::{Handler, ListenerRegistry, ListenerToken};
