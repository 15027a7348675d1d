// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot storage for replicas and their pending restyles.

use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker};

use crate::dirty;
use crate::id::{NodeId, SheetId};

/// One materialized copy of a canonical sheet inside one scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Replica {
    pub(crate) sheet: SheetId,
    /// Root of the owning scope.
    pub(crate) scope: NodeId,
    /// The style node in the scope's container.
    pub(crate) node: NodeId,
    /// Number of logged operations already applied on top of the copied
    /// content, or `None` if the content itself is stale.
    pub(crate) cursor: Option<usize>,
}

/// Replicas addressed by slot, recycled through a free list.
#[derive(Debug)]
pub(crate) struct ReplicaStore {
    slots: Vec<Option<Replica>>,
    free_list: Vec<u32>,
    dirty: DirtyTracker<u32>,
}

impl Default for ReplicaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplicaStore {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        }
    }

    pub(crate) fn insert(&mut self, replica: Replica) -> u32 {
        if let Some(slot) = self.free_list.pop() {
            self.slots[slot as usize] = Some(replica);
            slot
        } else {
            self.slots.push(Some(replica));
            (self.slots.len() - 1) as u32
        }
    }

    pub(crate) fn get(&self, slot: u32) -> Option<&Replica> {
        self.slots.get(slot as usize)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, slot: u32) -> Option<&mut Replica> {
        self.slots.get_mut(slot as usize)?.as_mut()
    }

    /// Frees a slot, dropping any pending restyle.
    pub(crate) fn remove(&mut self, slot: u32) -> Option<Replica> {
        let replica = self.slots.get_mut(slot as usize)?.take()?;
        self.dirty.remove_key(slot);
        self.free_list.push(slot);
        Some(replica)
    }

    pub(crate) fn mark_dirty(&mut self, slot: u32) {
        self.dirty.mark(slot, dirty::RESTYLE);
    }

    /// Takes every live slot marked since the last drain.
    pub(crate) fn drain_dirty(&mut self) -> Vec<u32> {
        let drained: Vec<u32> = self
            .dirty
            .drain(dirty::RESTYLE)
            .deterministic()
            .run()
            .collect();
        drained
            .into_iter()
            .filter(|&slot| self.get(slot).is_some())
            .collect()
    }

    /// Number of live replicas.
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replica(n: u32) -> Replica {
        Replica {
            sheet: SheetId::new(0, 1),
            scope: NodeId::new(0, 0),
            node: NodeId::new(n, 0),
            cursor: None,
        }
    }

    #[test]
    fn slots_are_recycled() {
        let mut store = ReplicaStore::new();
        let a = store.insert(replica(1));
        let b = store.insert(replica(2));
        assert_eq!(store.len(), 2);
        assert_eq!(store.remove(a).map(|r| r.node), Some(NodeId::new(1, 0)));
        assert!(store.get(a).is_none());
        assert!(store.remove(a).is_none());
        let c = store.insert(replica(3));
        assert_eq!(c, a);
        assert_ne!(b, c);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn removed_slots_leave_the_dirty_set() {
        let mut store = ReplicaStore::new();
        let a = store.insert(replica(1));
        let b = store.insert(replica(2));
        store.mark_dirty(b);
        store.mark_dirty(a);
        store.remove(b);
        assert_eq!(store.drain_dirty(), [a]);
        assert!(store.drain_dirty().is_empty());
    }
}
