// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Replica restyling.
//!
//! A replica is restyled after it is placed and after its sheet's content is
//! replaced. With deferred restyling the replica slot is marked dirty and
//! the host is asked for a frame; [`Engine::run_frame`] then drains the
//! dirty slots so every copy lands on a node the host has fully attached.
//!
//! Each replica remembers how much of its sheet's operation log it has seen.
//! A replica with stale content gets a full copy followed by the whole log;
//! a replica that only missed operations gets just the operations after its
//! cursor.

use crate::engine::Engine;
use crate::error::Result;
use crate::host::Host;

impl Engine {
    /// Schedules (or, without deferral, performs) a restyle of one replica.
    pub(crate) fn restyle_adopter<H: Host + ?Sized>(&mut self, host: &mut H, slot: u32) -> Result<()> {
        if self.config.deferred_restyle {
            self.replicas.mark_dirty(slot);
            host.request_frame();
            Ok(())
        } else {
            self.sync_replica(host, slot)
        }
    }

    /// Restyles every replica marked since the last frame.
    ///
    /// Replicas whose scope has been disconnected in the meantime are
    /// skipped; reconnecting restyles them again. Returns the number of
    /// replicas restyled.
    pub fn run_frame<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<usize> {
        let dirty = self.replicas.drain_dirty();
        let mut restyled = 0_u32;
        let mut skipped = 0_u32;
        for slot in dirty {
            let Some(replica) = self.replicas.get(slot) else {
                continue;
            };
            if !self.is_scope_connected(&*host, replica.scope) || !host.contains(replica.node) {
                skipped += 1;
                continue;
            }
            self.sync_replica(host, slot)?;
            restyled += 1;
        }
        if restyled + skipped > 0 {
            tracing::trace!(frame = self.frame_index, restyled, skipped, "frame");
        }
        self.tracer.frame(self.frame_index, restyled, skipped);
        self.frame_index += 1;
        Ok(restyled as usize)
    }

    /// Brings one replica up to date with its sheet.
    fn sync_replica<H: Host + ?Sized>(&mut self, host: &mut H, slot: u32) -> Result<()> {
        let Some(replica) = self.replicas.get_mut(slot) else {
            return Ok(());
        };
        let Some(sheet) = self.sheets.get(replica.sheet.idx as usize) else {
            return Ok(());
        };
        let from = match replica.cursor {
            Some(cursor) if cursor <= sheet.log.len() => cursor,
            _ => {
                host.set_style_text(replica.node, &sheet.content)?;
                0
            }
        };
        for op in &sheet.log[from..] {
            if let Err(err) = host.apply_rule(replica.node, op) {
                tracing::warn!(node = ?replica.node, op = op.name(), %err, "replay failed");
            }
        }
        replica.cursor = Some(sheet.log.len());
        let replayed = (sheet.log.len() - from) as u32;
        let (scope, id) = (replica.scope, replica.sheet);
        self.tracer.restyle(self.frame_index, scope, id, replayed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use crate::config::EngineConfig;
    use crate::dom::ShadowMode;
    use crate::testing::{Fixture, replica_rules};

    #[test]
    fn deferred_restyle_waits_for_frame() {
        let mut f = Fixture::new();
        let root = f.doc.root();
        let a = f.sheet("a { b: c }");
        f.engine.set_adopted_sheets(&mut f.doc, root, [a]).unwrap();
        assert!(f.doc.take_frame_request());
        assert!(replica_rules(&f, a, root).is_empty());
        assert_eq!(f.engine.run_frame(&mut f.doc), Ok(1));
        assert_eq!(replica_rules(&f, a, root), vec!["a { b: c }".to_string()]);
        assert_eq!(f.engine.run_frame(&mut f.doc), Ok(0));
    }

    #[test]
    fn immediate_restyle_copies_inline() {
        let mut f = Fixture::with_config(EngineConfig::immediate());
        let root = f.doc.root();
        let a = f.sheet("a { b: c }");
        f.engine.set_adopted_sheets(&mut f.doc, root, [a]).unwrap();
        assert!(!f.doc.take_frame_request());
        assert_eq!(replica_rules(&f, a, root), vec!["a { b: c }".to_string()]);
    }

    #[test]
    fn disconnected_replicas_are_skipped() {
        let mut f = Fixture::new();
        let (host, shadow) = f.component(f.doc.body(), ShadowMode::Open);
        let a = f.sheet("a { b: c }");
        f.engine.set_adopted_sheets(&mut f.doc, shadow, [a]).unwrap();
        f.doc.remove(host).unwrap();
        assert_eq!(f.engine.run_frame(&mut f.doc), Ok(0));
        assert!(replica_rules(&f, a, shadow).is_empty());
    }

    #[test]
    fn replay_after_copy_keeps_logged_ops() {
        let mut f = Fixture::new();
        let root = f.doc.root();
        let a = f.sheet("a { b: c }");
        f.engine.insert_rule(&mut f.doc, a, "x { y: z }", Some(1)).unwrap();
        f.engine.set_adopted_sheets(&mut f.doc, root, [a]).unwrap();
        f.settle();
        assert_eq!(
            replica_rules(&f, a, root),
            vec!["a { b: c }".to_string(), "x { y: z }".to_string()]
        );
        // A second frame must not replay the log again.
        let replica = f.engine.replica_for(a, root).unwrap();
        let slot = f.engine.sheets[a.index() as usize].adopter_for(root).unwrap();
        f.engine.restyle_adopter(&mut f.doc, slot).unwrap();
        f.settle();
        assert_eq!(f.doc.rules(replica).map(<[_]>::len), Some(2));
    }
}
