// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Subtree watching.
//!
//! Each connected scope subscribes to child-list changes under its
//! container. [`Engine::deliver_mutations`] drains every subscription and
//! handles each scope's records as one batch:
//!
//! 1. If any removed node is one of the scope's replicas, re-adopt once.
//! 2. Disconnect nested scopes inside removed subtrees that are no longer
//!    reachable.
//! 3. Connect nested scopes inside added subtrees.
//!
//! Repair runs before discovery because a single batch can hold both halves
//! of a move.

use alloc::vec::Vec;

use crate::discover::scope_roots;
use crate::engine::Engine;
use crate::error::Result;
use crate::host::{Host, MutationRecord};
use crate::id::NodeId;

/// Delivery rounds before [`Engine::deliver_mutations`] gives up on a
/// scope set that keeps producing records.
const MAX_DELIVERY_ROUNDS: usize = 32;

impl Engine {
    /// Handles every pending child-list record.
    ///
    /// Repeats until no subscription has records left, since connecting a
    /// scope can itself move nodes. Returns the number of records handled.
    /// Once the host reports teardown, all subscriptions are dropped and
    /// nothing else happens.
    pub fn deliver_mutations<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<usize> {
        if !host.is_alive() {
            self.disarm_all(host);
            return Ok(0);
        }
        let mut handled = 0;
        for _ in 0..MAX_DELIVERY_ROUNDS {
            let armed: Vec<NodeId> = self
                .scopes
                .iter()
                .filter(|(_, s)| s.is_armed() || !s.stashed.is_empty())
                .map(|(&root, _)| root)
                .collect();
            let mut quiet = true;
            for root in armed {
                let Some(scope) = self.scopes.get_mut(&root) else {
                    continue;
                };
                let batch = scope.take_batch(host);
                if batch.is_empty() {
                    continue;
                }
                quiet = false;
                handled += batch.len();
                self.handle_batch(host, root, &batch)?;
            }
            if quiet {
                return Ok(handled);
            }
        }
        tracing::warn!(rounds = MAX_DELIVERY_ROUNDS, "mutation delivery did not settle");
        Ok(handled)
    }

    /// Delivers mutations and runs frames until neither has work left.
    pub fn flush<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        for _ in 0..MAX_DELIVERY_ROUNDS {
            let records = self.deliver_mutations(host)?;
            let restyled = self.run_frame(host)?;
            if records == 0 && restyled == 0 {
                break;
            }
        }
        Ok(())
    }

    fn handle_batch<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        root: NodeId,
        batch: &[MutationRecord],
    ) -> Result<()> {
        if !host.is_alive() {
            self.disarm_all(host);
            return Ok(());
        }

        let repaired = batch
            .iter()
            .flat_map(|r| &r.removed)
            .any(|&node| self.is_replica_of(root, node));
        if repaired {
            tracing::debug!(scope = ?root, "replica removed externally; re-adopting");
            self.adopt(host, root)?;
        }

        let mut disconnected = 0_u32;
        for &node in batch.iter().flat_map(|r| &r.removed) {
            let nested: Vec<NodeId> = scope_roots(&*host, node).map(|(_, r)| r).collect();
            for nested in nested {
                if self.is_watching(nested) && !self.is_scope_connected(&*host, nested) {
                    self.disconnect_scope(host, nested);
                    disconnected += 1;
                }
            }
        }
        if batch.iter().any(|r| !r.removed.is_empty()) {
            // Removed subtrees the host already destroyed cannot be walked.
            disconnected += self.disconnect_unreachable(host);
        }

        let mut connected = 0_u32;
        for &node in batch.iter().flat_map(|r| &r.added) {
            if !host.is_connected(node) {
                continue;
            }
            let nested: Vec<NodeId> = scope_roots(&*host, node).map(|(_, r)| r).collect();
            for nested in nested {
                if self.wants_connect(&*host, nested) {
                    self.connect_scope(host, nested)?;
                    connected += 1;
                }
            }
        }

        self.tracer
            .mutation_batch(root, batch.len() as u32, repaired, connected, disconnected);
        Ok(())
    }

    /// Disconnects every watching scope whose root is no longer connected.
    fn disconnect_unreachable<H: Host + ?Sized>(&mut self, host: &mut H) -> u32 {
        let stale: Vec<NodeId> = self
            .scopes
            .iter()
            .filter(|(_, s)| s.is_armed())
            .map(|(&root, _)| root)
            .filter(|&root| !self.is_scope_connected(&*host, root))
            .collect();
        let mut disconnected = 0;
        for root in stale {
            if self.is_watching(root) {
                self.disconnect_scope(host, root);
                disconnected += 1;
            }
        }
        disconnected
    }

    /// Whether `node` is a registered replica in `root`'s scope.
    fn is_replica_of(&self, root: NodeId, node: NodeId) -> bool {
        let Some(scope) = self.scopes.get(&root) else {
            return false;
        };
        scope.unique.iter().any(|&sheet| {
            self.sheet_index(sheet)
                .and_then(|idx| self.sheets[idx].adopter_for(root))
                .and_then(|slot| self.replicas.get(slot))
                .is_some_and(|r| r.node == node)
        })
    }

    fn disarm_all<H: Host + ?Sized>(&mut self, host: &mut H) {
        for scope in self.scopes.values_mut() {
            if let Some(watch) = scope.watch.take() {
                host.unobserve(watch);
            }
            scope.stashed.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use crate::dom::{Document, ShadowMode};
    use crate::engine::Engine;
    use crate::testing::{Fixture, replica_rules, replica_texts};

    #[test]
    fn removal_is_repaired_in_order() {
        let mut f = Fixture::new();
        let root = f.doc.root();
        let a = f.sheet("a {}");
        let b = f.sheet("b {}");
        let c = f.sheet("c {}");
        f.engine.set_adopted_sheets(&mut f.doc, root, [a, b, c]).unwrap();
        f.settle();

        let middle = f.engine.replica_for(b, root).unwrap();
        f.doc.remove(middle).unwrap();
        f.settle();
        assert_eq!(replica_texts(&f, root), vec!["a {}", "b {}", "c {}"]);
        assert_eq!(f.engine.replica_for(b, root), Some(middle));
    }

    #[test]
    fn simultaneous_removals_need_one_repair() {
        let mut f = Fixture::new();
        let root = f.doc.root();
        let a = f.sheet("a {}");
        let b = f.sheet("b {}");
        f.engine.set_adopted_sheets(&mut f.doc, root, [a, b]).unwrap();
        f.settle();
        f.doc.clear_children(f.doc.body()).unwrap();
        f.settle();
        assert_eq!(replica_texts(&f, root), vec!["a {}", "b {}"]);
    }

    #[test]
    fn unrelated_removal_does_not_readopt() {
        let mut f = Fixture::new();
        let root = f.doc.root();
        let a = f.sheet("a {}");
        f.engine.set_adopted_sheets(&mut f.doc, root, [a]).unwrap();
        f.settle();
        let div = f.doc.create_element("div");
        f.doc.append_child(f.doc.body(), div).unwrap();
        f.settle();
        // The replica now precedes the div; a re-adopt would move it last.
        f.doc.remove(div).unwrap();
        let replica = f.engine.replica_for(a, root).unwrap();
        let p = f.doc.create_element("p");
        f.doc.append_child(f.doc.body(), p).unwrap();
        f.settle();
        let children: vec::Vec<_> = f.doc.children(f.doc.body()).collect();
        assert_eq!(children, vec![replica, p]);
    }

    #[test]
    fn propagation_reaches_every_connected_scope() {
        let mut f = Fixture::new();
        let root = f.doc.root();
        let (_, shadow) = f.component(f.doc.body(), ShadowMode::Open);
        let s = f.sheet("a { b: c }");
        f.engine.set_adopted_sheets(&mut f.doc, root, [s]).unwrap();
        f.engine.set_adopted_sheets(&mut f.doc, shadow, [s]).unwrap();
        f.settle();

        f.engine.insert_rule(&mut f.doc, s, "x { y: z }", Some(1)).unwrap();
        let expected = vec!["a { b: c }".to_string(), "x { y: z }".to_string()];
        // Current replicas take the operation directly, without a frame.
        assert_eq!(replica_rules(&f, s, root), expected);
        assert_eq!(replica_rules(&f, s, shadow), expected);
    }

    #[test]
    fn reconnect_replays_missed_operations() {
        let mut f = Fixture::new();
        let (host, shadow) = f.component(f.doc.body(), ShadowMode::Open);
        let s = f.sheet("a { b: c }");
        f.engine.set_adopted_sheets(&mut f.doc, shadow, [s]).unwrap();
        f.settle();

        f.doc.remove(host).unwrap();
        f.settle();
        assert!(!f.engine.is_watching(shadow));

        f.engine.insert_rule(&mut f.doc, s, "x { y: z }", Some(1)).unwrap();
        f.engine.delete_rule(&mut f.doc, s, 0).unwrap();
        assert_eq!(replica_rules(&f, s, shadow), vec!["a { b: c }".to_string()]);

        f.doc.append_child(f.doc.body(), host).unwrap();
        f.settle();
        assert!(f.engine.is_watching(shadow));
        assert_eq!(replica_rules(&f, s, shadow), vec!["x { y: z }".to_string()]);
    }

    #[test]
    fn nested_scope_three_levels_deep_connects_in_one_batch() {
        let mut f = Fixture::new();
        let s = f.sheet("a { b: c }");

        let outer = f.doc.create_element("div");
        let middle = f.doc.create_element("section");
        let inner = f.doc.create_element("x-inner");
        f.doc.append_child(outer, middle).unwrap();
        f.doc.append_child(middle, inner).unwrap();
        let shadow = f.doc.attach_shadow(inner, ShadowMode::Closed).unwrap();
        f.engine.set_adopted_sheets(&mut f.doc, shadow, [s]).unwrap();
        assert_eq!(f.engine.replica_for(s, shadow), None);

        f.doc.append_child(f.doc.body(), outer).unwrap();
        f.settle();
        assert!(f.engine.is_watching(shadow));
        assert_eq!(replica_texts(&f, shadow), vec!["a { b: c }"]);
    }

    #[test]
    fn scopes_inside_scopes_are_discovered() {
        let mut f = Fixture::new();
        let s = f.sheet("a {}");
        let outer = f.doc.create_element("x-outer");
        let outer_root = f.doc.attach_shadow(outer, ShadowMode::Open).unwrap();
        let (_, inner_root) = f.component(outer_root, ShadowMode::Closed);
        f.engine.set_adopted_sheets(&mut f.doc, inner_root, [s]).unwrap();

        f.doc.append_child(f.doc.body(), outer).unwrap();
        f.settle();
        assert!(f.engine.is_watching(outer_root));
        assert!(f.engine.is_watching(inner_root));
        assert_eq!(replica_texts(&f, inner_root), vec!["a {}"]);

        f.doc.remove(outer).unwrap();
        f.settle();
        assert!(!f.engine.is_watching(outer_root));
        assert!(!f.engine.is_watching(inner_root));
    }

    #[test]
    fn moves_within_one_batch_keep_scope_connected() {
        let mut f = Fixture::new();
        let (host, shadow) = f.component(f.doc.body(), ShadowMode::Open);
        let s = f.sheet("a {}");
        f.engine.set_adopted_sheets(&mut f.doc, shadow, [s]).unwrap();
        f.settle();
        let replica = f.engine.replica_for(s, shadow);

        let wrapper = f.doc.create_element("div");
        f.doc.append_child(f.doc.body(), wrapper).unwrap();
        f.doc.append_child(wrapper, host).unwrap();
        f.settle();
        assert!(f.engine.is_watching(shadow));
        assert_eq!(f.engine.replica_for(s, shadow), replica);
    }

    #[test]
    fn destroyed_subtree_still_disconnects_nested_scope() {
        let mut f = Fixture::new();
        let (host, shadow) = f.component(f.doc.body(), ShadowMode::Open);
        let s = f.sheet("a {}");
        f.engine.set_adopted_sheets(&mut f.doc, shadow, [s]).unwrap();
        f.settle();
        assert!(f.engine.is_watching(shadow));

        f.doc.remove(host).unwrap();
        f.doc.destroy(host);
        f.settle();
        assert!(!f.engine.is_watching(shadow));
        assert!(f.engine.is_watching(f.doc.root()));
    }

    #[test]
    fn teardown_disarms_quietly() {
        let mut doc = Document::new();
        let mut engine = Engine::new();
        engine.install(&mut doc).unwrap();
        let div = doc.create_element("div");
        doc.append_child(doc.body(), div).unwrap();
        doc.teardown();
        assert_eq!(engine.deliver_mutations(&mut doc), Ok(0));
        assert!(!engine.is_watching(doc.root()));
    }
}
