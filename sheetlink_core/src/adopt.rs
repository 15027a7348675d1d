// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The reconciler.
//!
//! [`Engine::adopt`] re-linearizes a connected scope's replicas so their
//! order in the container matches the scope's unique list:
//!
//! 1. Disarm the scope's watcher so the engine's own moves are not reported
//!    back as external removals.
//! 2. Move every replica, in order, into a detached staging fragment,
//!    creating and registering replicas for sheets that have none (or whose
//!    node the host destroyed).
//! 3. Append the fragment to the container in one step, after any content
//!    that is not a replica.
//! 4. Re-arm the watcher, even if a host call failed part-way.
//! 5. Restyle every replica.
//!
//! The pass is total and idempotent: running it twice yields the same order
//! and content.

use alloc::vec::Vec;

use crate::engine::Engine;
use crate::error::Result;
use crate::host::Host;
use crate::id::{NodeId, SheetId};
use crate::replica::Replica;

impl Engine {
    /// Brings `root`'s replicas in line with its unique list.
    pub(crate) fn adopt<H: Host + ?Sized>(&mut self, host: &mut H, root: NodeId) -> Result<()> {
        let Some(scope) = self.scopes.get_mut(&root) else {
            return Ok(());
        };
        scope.disarm(host);
        let placed = self.place_replicas(host, root);
        if let Some(scope) = self.scopes.get_mut(&root) {
            scope.arm(host);
        }
        let (slots, created) = placed?;

        for &slot in &slots {
            self.restyle_adopter(host, slot)?;
        }
        tracing::debug!(scope = ?root, sheets = slots.len(), created, "adopted");
        self.tracer.adopt(root, slots.len() as u32, created);
        Ok(())
    }

    /// Stages replicas in order and appends them to the container.
    ///
    /// Returns the slots placed and how many were created.
    fn place_replicas<H: Host + ?Sized>(&mut self, host: &mut H, root: NodeId) -> Result<(Vec<u32>, u32)> {
        let Some(scope) = self.scopes.get(&root) else {
            return Ok((Vec::new(), 0));
        };
        let container = scope.container;
        let unique = scope.unique.clone();

        let staging = host.create_fragment();
        let staged = self.stage(host, root, staging, &unique);
        let appended = staged.and_then(|placed| {
            host.append_child(container, staging)?;
            Ok(placed)
        });
        host.destroy(staging);
        appended
    }

    fn stage<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        root: NodeId,
        staging: NodeId,
        unique: &[SheetId],
    ) -> Result<(Vec<u32>, u32)> {
        let mut slots = Vec::with_capacity(unique.len());
        let mut created = 0;
        for &sheet in unique {
            let Some(idx) = self.sheet_index(sheet) else {
                continue;
            };
            let existing = self.sheets[idx]
                .adopter_for(root)
                .and_then(|slot| Some((slot, self.replicas.get(slot)?.node)));
            let (slot, node) = match existing {
                Some((slot, node)) if host.contains(node) => (slot, node),
                stale => {
                    // The host destroyed the old node; start over.
                    if let Some((slot, _)) = stale {
                        self.replicas.remove(slot);
                    }
                    let node = host.create_style();
                    let slot = self.replicas.insert(Replica {
                        sheet,
                        scope: root,
                        node,
                        cursor: None,
                    });
                    self.sheets[idx].set_adopter_for(root, slot);
                    created += 1;
                    (slot, node)
                }
            };
            host.append_child(staging, node)?;
            slots.push(slot);
        }
        Ok((slots, created))
    }
}
