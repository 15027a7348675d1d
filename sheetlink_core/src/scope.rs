// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scopes: per-root adoption state and lifecycle.
//!
//! A scope is created lazily the first time its root's adopted list is read
//! or written. It holds the requested list as the client last set it, the
//! deduplicated list actually materialized, and the subscription watching
//! its container.
//!
//! # Lifecycle
//!
//! A scope is *connected* when its root is part of the live tree: the
//! document once it is ready, a shadow root once its host element is
//! reachable from the document. Connecting arms the watcher, adopts, and
//! connects the nested scopes found beneath the container. Disconnecting
//! only disarms; replicas stay in place and are brought up to date from the
//! operation log when the scope reconnects.

use alloc::vec::Vec;

use crate::discover::scope_roots;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::host::{Host, MutationRecord, RootKind};
use crate::id::{NodeId, SheetId, WatchId};
use crate::sheet::SheetLike;

/// A value assigned to a root's adopted list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdoptedValue {
    /// An ordered sequence, possibly with duplicates.
    Sequence(Vec<SheetLike>),
    /// Anything that is not a sequence.
    NotASequence,
}

impl From<Vec<SheetLike>> for AdoptedValue {
    fn from(items: Vec<SheetLike>) -> Self {
        Self::Sequence(items)
    }
}

impl From<Vec<SheetId>> for AdoptedValue {
    fn from(ids: Vec<SheetId>) -> Self {
        Self::Sequence(ids.into_iter().map(SheetLike::from).collect())
    }
}

impl From<&[SheetId]> for AdoptedValue {
    fn from(ids: &[SheetId]) -> Self {
        Self::Sequence(ids.iter().copied().map(SheetLike::from).collect())
    }
}

impl<const N: usize> From<[SheetId; N]> for AdoptedValue {
    fn from(ids: [SheetId; N]) -> Self {
        Self::Sequence(ids.into_iter().map(SheetLike::from).collect())
    }
}

/// Adoption state of one root.
#[derive(Debug)]
pub(crate) struct Scope {
    pub(crate) kind: RootKind,
    /// Node replicas are inserted into.
    pub(crate) container: NodeId,
    pub(crate) requested: Vec<SheetId>,
    pub(crate) unique: Vec<SheetId>,
    pub(crate) watch: Option<WatchId>,
    /// Records taken while the watcher was briefly disarmed.
    pub(crate) stashed: Vec<MutationRecord>,
}

impl Scope {
    fn new(kind: RootKind, container: NodeId) -> Self {
        Self {
            kind,
            container,
            requested: Vec::new(),
            unique: Vec::new(),
            watch: None,
            stashed: Vec::new(),
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.watch.is_some()
    }

    pub(crate) fn arm<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.watch.is_none() {
            self.watch = Some(host.observe(self.container));
        }
    }

    /// Drops the subscription, keeping records it had not delivered.
    pub(crate) fn disarm<H: Host + ?Sized>(&mut self, host: &mut H) {
        if let Some(watch) = self.watch.take() {
            self.stashed.extend(host.take_records(watch));
            host.unobserve(watch);
        }
    }

    /// Takes stashed and queued records as one batch.
    pub(crate) fn take_batch<H: Host + ?Sized>(&mut self, host: &mut H) -> Vec<MutationRecord> {
        let mut batch = core::mem::take(&mut self.stashed);
        if let Some(watch) = self.watch {
            batch.extend(host.take_records(watch));
        }
        batch
    }
}

/// Removes duplicates, keeping first occurrences in order.
fn dedupe(sheets: &[SheetId]) -> Vec<SheetId> {
    let mut unique = Vec::with_capacity(sheets.len());
    for &s in sheets {
        if !unique.contains(&s) {
            unique.push(s);
        }
    }
    unique
}

impl Engine {
    /// Returns the list last assigned to `root`, creating its scope if
    /// needed.
    pub fn adopted_sheets<H: Host + ?Sized>(&mut self, host: &H, root: NodeId) -> Result<&[SheetId]> {
        Ok(&self.scope_for(host, root)?.requested)
    }

    /// Assigns `root`'s adopted list.
    ///
    /// Validation happens before any change: a rejected value leaves the
    /// scope as it was. Sheets dropped from the list lose their replica in
    /// this scope; if the scope is connected, the rest are re-adopted in the
    /// new order.
    pub fn set_adopted_sheets<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        root: NodeId,
        value: impl Into<AdoptedValue>,
    ) -> Result<()> {
        let kind = self.scope_for(&*host, root)?.kind;
        let AdoptedValue::Sequence(items) = value.into() else {
            return Err(Error::InvalidSheetList { kind });
        };
        let mut sheets = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            match *item {
                SheetLike::Constructed(id) if self.sheet_index(id).is_some() => sheets.push(id),
                SheetLike::NonConstructed(_) => {}
                SheetLike::Constructed(_) | SheetLike::Foreign => {
                    return Err(Error::ConvertSheet { kind, position });
                }
            }
        }
        if let Some(position) = items
            .iter()
            .position(|item| matches!(item, SheetLike::NonConstructed(_)))
        {
            return Err(Error::NonConstructedAdopt { kind, position });
        }
        self.update(host, root, sheets)
    }

    /// Edits `root`'s adopted list in place and reassigns it.
    ///
    /// This is the counterpart of array mutators (`push`, `pop`, `splice`,
    /// `sort` and friends) on the script-visible list.
    pub fn modify_adopted_sheets<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        root: NodeId,
        edit: impl FnOnce(&mut Vec<SheetId>),
    ) -> Result<()> {
        let mut sheets = self.scope_for(&*host, root)?.requested.clone();
        edit(&mut sheets);
        self.set_adopted_sheets(host, root, sheets)
    }

    /// Returns the deduplicated list materialized for `root`.
    #[must_use]
    pub fn unique_sheets(&self, root: NodeId) -> Option<&[SheetId]> {
        self.scopes.get(&root).map(|s| s.unique.as_slice())
    }

    /// Returns the replica node of `sheet` in `root`'s scope.
    #[must_use]
    pub fn replica_for(&self, sheet: SheetId, root: NodeId) -> Option<NodeId> {
        let idx = self.sheet_index(sheet)?;
        let slot = self.sheets[idx].adopter_for(root)?;
        self.replicas.get(slot).map(|r| r.node)
    }

    /// Whether `root` is part of the live tree.
    pub fn is_scope_connected<H: Host + ?Sized>(&self, host: &H, root: NodeId) -> bool {
        match host.root_kind(root) {
            Some(RootKind::Document) => host.is_alive() && host.is_ready() && root == host.document(),
            Some(RootKind::ShadowRoot) => host.is_alive() && host.is_connected(root),
            None => false,
        }
    }

    /// Whether `root`'s scope is currently watching its container.
    #[must_use]
    pub fn is_watching(&self, root: NodeId) -> bool {
        self.scopes.get(&root).is_some_and(Scope::is_armed)
    }

    /// Connects `root`'s scope and every nested scope beneath it.
    ///
    /// Arms the watcher, adopts the unique list, then walks the container
    /// for nested roots. Nested scopes that are already watching are left
    /// alone.
    pub fn connect_scope<H: Host + ?Sized>(&mut self, host: &mut H, root: NodeId) -> Result<()> {
        let mut work = alloc::vec![root];
        while let Some(root) = work.pop() {
            let scope = self.scope_for(&*host, root)?;
            let was_armed = scope.is_armed();
            scope.arm(host);
            let (kind, container, adopt) = (scope.kind, scope.container, !scope.unique.is_empty());
            if !was_armed {
                tracing::debug!(scope = ?root, %kind, "scope connected");
                self.tracer.scope_state(root, kind, true);
            }
            if adopt {
                self.adopt(host, root)?;
            }
            let nested: Vec<NodeId> = scope_roots(&*host, container).map(|(_, r)| r).collect();
            for nested in nested.into_iter().rev() {
                if nested != root && self.wants_connect(&*host, nested) {
                    work.push(nested);
                }
            }
        }
        Ok(())
    }

    /// Disconnects `root`'s scope and every watching scope nested beneath
    /// it. Replicas are left in place.
    pub fn disconnect_scope<H: Host + ?Sized>(&mut self, host: &mut H, root: NodeId) {
        let mut work = alloc::vec![root];
        while let Some(root) = work.pop() {
            let Some(scope) = self.scopes.get_mut(&root) else {
                continue;
            };
            if !scope.is_armed() {
                continue;
            }
            scope.disarm(host);
            scope.stashed.clear();
            let (kind, container) = (scope.kind, scope.container);
            tracing::debug!(scope = ?root, %kind, "scope disconnected");
            self.tracer.scope_state(root, kind, false);
            work.extend(
                scope_roots(&*host, container)
                    .map(|(_, r)| r)
                    .filter(|r| *r != root && self.is_watching(*r)),
            );
        }
    }

    /// Drops `root`'s scope with its replicas and pending restyles.
    ///
    /// Returns whether a scope existed. Replica nodes still alive are
    /// detached and destroyed.
    pub fn forget_scope<H: Host + ?Sized>(&mut self, host: &mut H, root: NodeId) -> bool {
        let Some(mut scope) = self.scopes.remove(&root) else {
            return false;
        };
        if let Some(watch) = scope.watch.take() {
            host.unobserve(watch);
        }
        for sheet in scope.unique {
            self.drop_replica(host, sheet, root);
        }
        tracing::debug!(scope = ?root, "scope forgotten");
        true
    }

    /// Forgets every scope whose root the host no longer knows.
    ///
    /// Returns the number of scopes dropped.
    pub fn prune<H: Host + ?Sized>(&mut self, host: &mut H) -> usize {
        let dead: Vec<NodeId> = self
            .scopes
            .keys()
            .copied()
            .filter(|&root| !host.contains(root))
            .collect();
        for &root in &dead {
            self.forget_scope(host, root);
        }
        dead.len()
    }

    /// Returns `root`'s scope, creating it on first use.
    pub(crate) fn scope_for<H: Host + ?Sized>(&mut self, host: &H, root: NodeId) -> Result<&mut Scope> {
        if !self.scopes.contains_key(&root) {
            let kind = host.root_kind(root).ok_or(Error::NotARoot { node: root })?;
            let container = host
                .adopter_container(root)
                .ok_or(Error::NotARoot { node: root })?;
            self.scopes.insert(root, Scope::new(kind, container));
        }
        self.scopes
            .get_mut(&root)
            .ok_or(Error::NotARoot { node: root })
    }

    /// Whether `root` has a scope that is connected to the live tree.
    pub(crate) fn scope_connected<H: Host + ?Sized>(&self, host: &H, root: NodeId) -> bool {
        self.scopes.contains_key(&root) && self.is_scope_connected(host, root)
    }

    /// Whether discovery should connect the scope at `root`.
    pub(crate) fn wants_connect<H: Host + ?Sized>(&self, host: &H, root: NodeId) -> bool {
        if self.is_watching(root) || !self.is_scope_connected(host, root) {
            return false;
        }
        self.config.connect_empty_scopes
            || self
                .scopes
                .get(&root)
                .is_some_and(|s| !s.requested.is_empty())
    }

    /// Stores a validated list and brings the scope's replicas in line.
    fn update<H: Host + ?Sized>(&mut self, host: &mut H, root: NodeId, sheets: Vec<SheetId>) -> Result<()> {
        let scope = self.scope_for(&*host, root)?;
        let unique = dedupe(&sheets);
        let removed: Vec<SheetId> = scope
            .unique
            .iter()
            .copied()
            .filter(|s| !unique.contains(s))
            .collect();
        scope.requested = sheets;
        scope.unique = unique;
        let (armed, empty) = (scope.is_armed(), scope.unique.is_empty());

        for sheet in removed {
            self.drop_replica(host, sheet, root);
        }
        if empty || !self.is_scope_connected(&*host, root) {
            return Ok(());
        }
        if armed {
            self.adopt(host, root)
        } else {
            self.connect_scope(host, root)
        }
    }

    /// Removes `sheet`'s replica from `root`'s scope.
    fn drop_replica<H: Host + ?Sized>(&mut self, host: &mut H, sheet: SheetId, root: NodeId) {
        let Some(idx) = self.sheet_index(sheet) else {
            return;
        };
        let Some(slot) = self.sheets[idx].remove_adopter_for(root) else {
            return;
        };
        let Some(replica) = self.replicas.remove(slot) else {
            return;
        };
        if host.contains(replica.node) {
            if let Err(err) = host.remove(replica.node) {
                tracing::warn!(node = ?replica.node, %err, "failed to detach replica");
            }
            host.destroy(replica.node);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::dom::ShadowMode;
    use crate::testing::{Fixture, replica_texts};

    #[test]
    fn adopted_list_keeps_duplicates_and_unique_list_drops_them() {
        let mut f = Fixture::new();
        let root = f.doc.root();
        let a = f.sheet("a {}");
        let b = f.sheet("b {}");
        f.engine.set_adopted_sheets(&mut f.doc, root, [a, a, b]).unwrap();
        f.settle();
        assert_eq!(f.engine.adopted_sheets(&f.doc, root).unwrap(), &[a, a, b]);
        assert_eq!(f.engine.unique_sheets(root), Some(&[a, b][..]));
        assert_eq!(replica_texts(&f, root), vec!["a {}", "b {}"]);
    }

    #[test]
    fn order_follows_latest_assignment() {
        const ORDERS: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        let texts = ["a {}", "b {}", "c {}"];
        let mut f = Fixture::new();
        let root = f.doc.root();
        let s: Vec<SheetId> = texts.iter().map(|t| f.sheet(t)).collect();
        let pick = |order: [usize; 3]| order.map(|i| s[i]);

        f.engine.set_adopted_sheets(&mut f.doc, root, pick(ORDERS[0])).unwrap();
        f.settle();
        let replicas: Vec<_> = s.iter().map(|&sheet| f.engine.replica_for(sheet, root)).collect();

        for from in ORDERS {
            for to in ORDERS {
                f.engine.set_adopted_sheets(&mut f.doc, root, pick(from)).unwrap();
                f.settle();
                f.engine.set_adopted_sheets(&mut f.doc, root, pick(to)).unwrap();
                f.settle();
                let expected: Vec<&str> = to.iter().map(|&i| texts[i]).collect();
                assert_eq!(replica_texts(&f, root), expected, "{from:?} -> {to:?}");
                for (i, &sheet) in s.iter().enumerate() {
                    assert_eq!(f.engine.replica_for(sheet, root), replicas[i], "replica of sheet {i} replaced");
                }
            }
        }
    }

    #[test]
    fn removed_sheets_lose_their_replica() {
        let mut f = Fixture::new();
        let root = f.doc.root();
        let a = f.sheet("a {}");
        let b = f.sheet("b {}");
        f.engine.set_adopted_sheets(&mut f.doc, root, [a, b]).unwrap();
        f.settle();
        let old = f.engine.replica_for(a, root).unwrap();
        f.engine.set_adopted_sheets(&mut f.doc, root, [b]).unwrap();
        f.settle();
        assert_eq!(replica_texts(&f, root), vec!["b {}"]);
        assert_eq!(f.engine.replica_for(a, root), None);
        assert!(!f.doc.is_alive(old));
        assert_eq!(f.engine.replicas.len(), 1);
    }

    #[test]
    fn validation_rejects_before_any_change() {
        let mut f = Fixture::new();
        let root = f.doc.root();
        let a = f.sheet("a {}");
        f.engine.set_adopted_sheets(&mut f.doc, root, [a]).unwrap();

        let err = f
            .engine
            .set_adopted_sheets(&mut f.doc, root, AdoptedValue::NotASequence)
            .unwrap_err();
        assert_eq!(err, Error::InvalidSheetList { kind: RootKind::Document });

        let err = f
            .engine
            .set_adopted_sheets(&mut f.doc, root, vec![SheetLike::Foreign])
            .unwrap_err();
        assert_eq!(
            err,
            Error::ConvertSheet {
                kind: RootKind::Document,
                position: 0
            }
        );
        assert_eq!(f.engine.adopted_sheets(&f.doc, root).unwrap(), &[a]);
    }

    #[test]
    fn foreign_object_wins_over_non_constructed() {
        let mut f = Fixture::new();
        let root = f.doc.root();
        let a = f.sheet("a {}");
        let native = f.doc.create_element("style");
        let err = f
            .engine
            .set_adopted_sheets(
                &mut f.doc,
                root,
                vec![SheetLike::NonConstructed(native), a.into(), SheetLike::Foreign],
            )
            .unwrap_err();
        assert_eq!(
            err,
            Error::ConvertSheet {
                kind: RootKind::Document,
                position: 2
            }
        );

        let err = f
            .engine
            .set_adopted_sheets(&mut f.doc, root, vec![a.into(), SheetLike::NonConstructed(native)])
            .unwrap_err();
        assert_eq!(
            err,
            Error::NonConstructedAdopt {
                kind: RootKind::Document,
                position: 1
            }
        );
        assert!(err.to_string().contains("Can't adopt non-constructed stylesheets"));
    }

    #[test]
    fn sheets_from_another_engine_do_not_convert() {
        let mut f = Fixture::new();
        let (_, shadow) = f.component(f.doc.body(), ShadowMode::Open);
        let mut other = Engine::new();
        let theirs = other.create_sheet(&mut f.doc);
        let err = f.engine.set_adopted_sheets(&mut f.doc, shadow, [theirs]).unwrap_err();
        assert_eq!(
            err,
            Error::ConvertSheet {
                kind: RootKind::ShadowRoot,
                position: 0
            }
        );
    }

    #[test]
    fn non_roots_are_rejected() {
        let mut f = Fixture::new();
        let body = f.doc.body();
        assert_eq!(
            f.engine.adopted_sheets(&f.doc, body),
            Err(Error::NotARoot { node: body })
        );
    }

    #[test]
    fn modify_edits_requested_list() {
        let mut f = Fixture::new();
        let root = f.doc.root();
        let a = f.sheet("a {}");
        let b = f.sheet("b {}");
        f.engine.set_adopted_sheets(&mut f.doc, root, [a]).unwrap();
        f.engine
            .modify_adopted_sheets(&mut f.doc, root, |list| list.push(b))
            .unwrap();
        f.engine
            .modify_adopted_sheets(&mut f.doc, root, |list| list.reverse())
            .unwrap();
        f.settle();
        assert_eq!(f.engine.adopted_sheets(&f.doc, root).unwrap(), &[b, a]);
        assert_eq!(replica_texts(&f, root), vec!["b {}", "a {}"]);

        f.engine
            .modify_adopted_sheets(&mut f.doc, root, |list| {
                list.pop();
            })
            .unwrap();
        f.settle();
        assert_eq!(replica_texts(&f, root), vec!["b {}"]);
    }

    #[test]
    fn updates_on_detached_scope_wait_for_connection() {
        let mut f = Fixture::new();
        let host = f.doc.create_element("x-late");
        let shadow = f.doc.attach_shadow(host, ShadowMode::Open).unwrap();
        let a = f.sheet("a {}");
        f.engine.set_adopted_sheets(&mut f.doc, shadow, [a]).unwrap();
        f.settle();
        assert!(!f.engine.is_scope_connected(&f.doc, shadow));
        assert_eq!(f.engine.replica_for(a, shadow), None);

        f.doc.append_child(f.doc.body(), host).unwrap();
        f.settle();
        assert!(f.engine.is_watching(shadow));
        assert_eq!(replica_texts(&f, shadow), vec!["a {}"]);
    }

    #[test]
    fn forget_and_prune_drop_scopes() {
        let mut f = Fixture::new();
        let (host, shadow) = f.component(f.doc.body(), ShadowMode::Open);
        let a = f.sheet("a {}");
        f.engine.set_adopted_sheets(&mut f.doc, shadow, [a]).unwrap();
        f.settle();
        let replica = f.engine.replica_for(a, shadow).unwrap();

        f.doc.destroy(host);
        assert_eq!(f.engine.prune(&mut f.doc), 1);
        assert_eq!(f.engine.unique_sheets(shadow), None);
        assert_eq!(f.engine.replica_for(a, shadow), None);
        assert!(!f.doc.is_alive(replica));
        assert_eq!(f.engine.replicas.len(), 0);
        assert!(!f.engine.forget_scope(&mut f.doc, shadow));
    }

    #[test]
    fn forget_detaches_live_replicas() {
        let mut f = Fixture::new();
        let root = f.doc.root();
        let a = f.sheet("a {}");
        f.engine.set_adopted_sheets(&mut f.doc, root, [a]).unwrap();
        f.settle();
        assert!(f.engine.forget_scope(&mut f.doc, root));
        assert!(replica_texts(&f, root).is_empty());
        assert!(!f.engine.is_watching(root));
    }
}
