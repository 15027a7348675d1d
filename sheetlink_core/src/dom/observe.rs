// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Child-list subscriptions.

use alloc::vec::Vec;

use crate::host::MutationRecord;
use crate::id::{INVALID, NodeId, WatchId};

use super::store::Document;

/// One subscription: a subtree and the records queued for it.
#[derive(Debug)]
pub(crate) struct Observer {
    target: NodeId,
    records: Vec<MutationRecord>,
}

impl Document {
    /// Subscribes to child-list changes in the subtree rooted at `target`.
    ///
    /// Records for edits inside shadow trees attached below `target` are not
    /// delivered; observe the shadow root itself for those.
    ///
    /// Slots freed by [`unobserve`](Self::unobserve) are reused, so a
    /// dropped [`WatchId`] must not be used again.
    pub fn observe(&mut self, target: NodeId) -> WatchId {
        let observer = Some(Observer {
            target,
            records: Vec::new(),
        });
        if let Some(slot) = self.free_observers.pop() {
            self.observers[slot as usize] = observer;
            WatchId(slot)
        } else {
            self.observers.push(observer);
            WatchId((self.observers.len() - 1) as u32)
        }
    }

    /// Drops a subscription and any records it has not delivered.
    pub fn unobserve(&mut self, watch: WatchId) {
        if let Some(slot) = self.observers.get_mut(watch.0 as usize)
            && slot.take().is_some()
        {
            self.free_observers.push(watch.0);
        }
    }

    /// Takes every record queued for `watch`.
    pub fn take_records(&mut self, watch: WatchId) -> Vec<MutationRecord> {
        match self.observers.get_mut(watch.0 as usize) {
            Some(Some(o)) => core::mem::take(&mut o.records),
            _ => Vec::new(),
        }
    }

    /// Returns how many records are queued for `watch`.
    #[must_use]
    pub fn pending_records(&self, watch: WatchId) -> usize {
        match self.observers.get(watch.0 as usize) {
            Some(Some(o)) => o.records.len(),
            _ => 0,
        }
    }

    /// Whether any subscription has undelivered records.
    #[must_use]
    pub fn has_pending_records(&self) -> bool {
        self.observers
            .iter()
            .flatten()
            .any(|o| !o.records.is_empty())
    }

    /// Queues `record` on every subscription that covers its target.
    pub(crate) fn dispatch(&mut self, record: MutationRecord) {
        if !self.alive || self.observers.is_empty() {
            return;
        }
        let interested: Vec<usize> = self
            .observers
            .iter()
            .enumerate()
            .filter_map(|(i, o)| {
                let o = o.as_ref()?;
                self.is_inclusive_ancestor(o.target, record.target).then_some(i)
            })
            .collect();
        for i in interested {
            if let Some(o) = &mut self.observers[i] {
                o.records.push(record.clone());
            }
        }
    }

    /// Whether `ancestor` is `node` or one of its ancestors in the same tree.
    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.is_alive(ancestor) {
            return false;
        }
        let mut idx = node.idx;
        while idx != INVALID {
            if idx == ancestor.idx {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }
}
