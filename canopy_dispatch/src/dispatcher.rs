// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The bubbling dispatch walk.

use core::fmt::Debug;
use core::hash::Hash;

use crate::event::Event;
use crate::registry::ListenerRegistry;

/// Bubbles `event` from its target up the parent chain.
///
/// At each node, every handler registered for `event.kind` runs with
/// `current_target` set to that node; `target` stays fixed. The walk ends
/// when a node has no parent or a handler stopped propagation — remaining
/// handlers on the stopping node still run, matching DOM semantics.
///
/// Handler snapshots are taken per step, so a node whose registrations
/// disappear between steps (removed by application code reacting to an
/// earlier event) simply contributes no handlers; a cycle in `parent_of`
/// is the caller's bug and would loop.
///
/// Handler panics are not caught; they abort the remaining walk and
/// propagate to the caller.
pub fn bubble<K>(
    registry: &ListenerRegistry<K>,
    parent_of: impl Fn(K) -> Option<K>,
    event: &mut Event<K>,
) where
    K: Copy + Eq + Hash + Debug,
{
    let mut node = event.target;
    loop {
        event.current_target = node;
        for handler in registry.handlers(node, event.kind) {
            (&mut *handler.borrow_mut())(event);
        }
        if event.propagation_stopped() {
            return;
        }
        match parent_of(node) {
            Some(parent) => node = parent,
            None => return,
        }
    }
}
