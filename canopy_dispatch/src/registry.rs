// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener storage with O(1) per-kind existence gating.

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::event::{Event, EventKind};

/// A registered handler: shared, interiorly mutable, re-invocable.
pub type Handler<K> = Rc<RefCell<dyn FnMut(&mut Event<K>)>>;

/// Opaque handle identifying one registration, for removal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ListenerToken(u64);

type NodeHandlers<K> = SmallVec<[(ListenerToken, Handler<K>); 1]>;

/// Handlers per `(kind, key)`, with per-kind registration counters.
///
/// The counters make "does anything at all listen for kind X" a constant
/// array read, which upstream uses to gate hit testing — the same shape as
/// a per-channel dirty set. Multiple independent handlers may be
/// registered for one `(key, kind)` pair; they run in registration order.
///
/// All removal paths are idempotent: unknown keys, kinds, and tokens are
/// silently ignored.
pub struct ListenerRegistry<K>
where
    K: Copy + Eq + Hash + Debug,
{
    kinds: [HashMap<K, NodeHandlers<K>>; EventKind::COUNT],
    counts: [usize; EventKind::COUNT],
    next_token: u64,
}

impl<K> Debug for ListenerRegistry<K>
where
    K: Copy + Eq + Hash + Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("counts", &self.counts)
            .finish_non_exhaustive()
    }
}

impl<K> Default for ListenerRegistry<K>
where
    K: Copy + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> ListenerRegistry<K>
where
    K: Copy + Eq + Hash + Debug,
{
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            kinds: core::array::from_fn(|_| HashMap::new()),
            counts: [0; EventKind::COUNT],
            next_token: 0,
        }
    }

    /// Registers `handler` for `kind` on `key`, returning the token that
    /// removes exactly this registration.
    pub fn add(
        &mut self,
        key: K,
        kind: EventKind,
        handler: impl FnMut(&mut Event<K>) + 'static,
    ) -> ListenerToken {
        let token = ListenerToken(self.next_token);
        self.next_token += 1;
        self.kinds[kind.index()]
            .entry(key)
            .or_default()
            .push((token, Rc::new(RefCell::new(handler))));
        self.counts[kind.index()] += 1;
        token
    }

    /// Removes one registration. Unknown tokens are ignored.
    pub fn remove(&mut self, key: K, kind: EventKind, token: ListenerToken) {
        let map = &mut self.kinds[kind.index()];
        let Some(handlers) = map.get_mut(&key) else {
            return;
        };
        let Some(pos) = handlers.iter().position(|(t, _)| *t == token) else {
            return;
        };
        handlers.remove(pos);
        self.counts[kind.index()] -= 1;
        if handlers.is_empty() {
            map.remove(&key);
        }
    }

    /// Removes every registration on `key`, across all kinds.
    pub fn remove_all(&mut self, key: K) {
        for (map, count) in self.kinds.iter_mut().zip(self.counts.iter_mut()) {
            if let Some(handlers) = map.remove(&key) {
                *count -= handlers.len();
            }
        }
    }

    /// Returns `true` if any object listens for `kind`. O(1).
    #[must_use]
    pub fn has_any(&self, kind: EventKind) -> bool {
        self.counts[kind.index()] > 0
    }

    /// Returns `true` if any object listens for any of `kinds`.
    #[must_use]
    pub fn has_any_of(&self, kinds: &[EventKind]) -> bool {
        kinds.iter().any(|kind| self.has_any(*kind))
    }

    /// Returns `true` if `key` has a handler for `kind`.
    #[must_use]
    pub fn key_has(&self, key: K, kind: EventKind) -> bool {
        self.kinds[kind.index()].contains_key(&key)
    }

    /// Returns `true` if `key` has a handler for any of `kinds`.
    #[must_use]
    pub fn key_has_any_of(&self, key: K, kinds: &[EventKind]) -> bool {
        kinds.iter().any(|kind| self.key_has(key, *kind))
    }

    /// Visits each of `key`'s handlers for `kind`, in registration order.
    pub fn for_each(&self, key: K, kind: EventKind, mut visit: impl FnMut(&Handler<K>)) {
        if let Some(handlers) = self.kinds[kind.index()].get(&key) {
            for (_, handler) in handlers {
                visit(handler);
            }
        }
    }

    /// Snapshot of `key`'s handlers for `kind`, cloned handles in
    /// registration order. Used by the dispatch walk so entries can vanish
    /// between steps without invalidating anything.
    #[must_use]
    pub fn handlers(&self, key: K, kind: EventKind) -> SmallVec<[Handler<K>; 2]> {
        match self.kinds[kind.index()].get(&key) {
            Some(handlers) => handlers.iter().map(|(_, h)| Rc::clone(h)).collect(),
            None => SmallVec::new(),
        }
    }

    /// Total registrations across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|c| *c == 0)
    }

    /// Drops every registration.
    pub fn clear(&mut self) {
        for map in &mut self.kinds {
            map.clear();
        }
        self.counts = [0; EventKind::COUNT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn counters_gate_in_constant_time() {
        let mut registry: ListenerRegistry<u32> = ListenerRegistry::new();
        assert!(!registry.has_any(EventKind::Click));

        let token = registry.add(1, EventKind::Click, |_| {});
        assert!(registry.has_any(EventKind::Click));
        assert!(registry.has_any_of(EventKind::CLICK));
        assert!(!registry.has_any_of(EventKind::HOVER));

        registry.remove(1, EventKind::Click, token);
        assert!(!registry.has_any(EventKind::Click));
        assert!(registry.is_empty());
    }

    #[test]
    fn multiple_handlers_run_in_registration_order() {
        let mut registry: ListenerRegistry<u32> = ListenerRegistry::new();
        registry.add(1, EventKind::Click, |e| e.timestamp_ms += 1);
        registry.add(1, EventKind::Click, |e| e.timestamp_ms *= 10);

        let mut event = Event::new(EventKind::Click, 1, 0);
        registry.for_each(1, EventKind::Click, |h| (&mut *h.borrow_mut())(&mut event));
        // (0 + 1) * 10: order matters.
        assert_eq!(event.timestamp_ms, 10);
    }

    #[test]
    fn removal_is_idempotent() {
        let mut registry: ListenerRegistry<u32> = ListenerRegistry::new();
        let token = registry.add(1, EventKind::MouseOver, |_| {});
        registry.remove(1, EventKind::MouseOver, token);
        registry.remove(1, EventKind::MouseOver, token);
        registry.remove(99, EventKind::MouseOver, token);
        registry.remove_all(42);
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_all_clears_every_kind() {
        let mut registry: ListenerRegistry<u32> = ListenerRegistry::new();
        registry.add(1, EventKind::Click, |_| {});
        registry.add(1, EventKind::MouseOver, |_| {});
        registry.add(2, EventKind::Click, |_| {});

        registry.remove_all(1);
        assert!(!registry.key_has(1, EventKind::Click));
        assert!(!registry.key_has(1, EventKind::MouseOver));
        assert!(registry.key_has(2, EventKind::Click));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn removing_one_token_keeps_siblings() {
        let mut registry: ListenerRegistry<u32> = ListenerRegistry::new();
        let first = registry.add(1, EventKind::Click, |_| {});
        let _second = registry.add(1, EventKind::Click, |_| {});

        registry.remove(1, EventKind::Click, first);
        assert!(registry.key_has(1, EventKind::Click));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn snapshot_is_ordered_and_detached() {
        let mut registry: ListenerRegistry<u32> = ListenerRegistry::new();
        registry.add(1, EventKind::Drop, |e| e.timestamp_ms += 1);
        registry.add(1, EventKind::Drop, |e| e.timestamp_ms += 2);

        let snapshot = registry.handlers(1, EventKind::Drop);
        registry.remove_all(1);

        // The snapshot still runs even though the registry entry is gone.
        let mut event = Event::new(EventKind::Drop, 1, 0);
        let handlers: Vec<_> = snapshot.into_iter().collect();
        for h in &handlers {
            (&mut *h.borrow_mut())(&mut event);
        }
        assert_eq!(event.timestamp_ms, 3);
    }
}
