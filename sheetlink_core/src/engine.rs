// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine: canonical sheets, the scope registry and the replica store.
//!
//! An [`Engine`] is driven entirely by its caller. Client operations
//! ([`set_adopted_sheets`](Engine::set_adopted_sheets),
//! [`replace_sync`](Engine::replace_sync), [`apply`](Engine::apply), ...)
//! run to completion synchronously. The two asynchronous boundaries are
//! explicit calls the host makes later:
//!
//! - [`deliver_mutations`](Engine::deliver_mutations) after child-list
//!   records have queued, which repairs removed replicas and connects or
//!   disconnects nested scopes.
//! - [`run_frame`](Engine::run_frame) after the host was asked for a frame,
//!   which performs deferred replica restyles.
//!
//! ```rust
//! use sheetlink_core::Engine;
//! use sheetlink_core::dom::{Document, ShadowMode};
//!
//! # fn main() -> sheetlink_core::Result<()> {
//! let mut doc = Document::new();
//! let mut engine = Engine::new();
//! engine.install(&mut doc)?;
//!
//! let sheet = engine.create_sheet(&mut doc);
//! engine.replace_sync(&mut doc, sheet, "h1 { color: tomato; }")?;
//!
//! let host = doc.create_element("x-card");
//! let shadow = doc.attach_shadow(host, ShadowMode::Closed)?;
//! engine.set_adopted_sheets(&mut doc, shadow, [sheet])?;
//! doc.append_child(doc.body(), host)?;
//!
//! engine.flush(&mut doc)?;
//! let replica = engine.replica_for(sheet, shadow).expect("adopted");
//! assert_eq!(doc.text_content(replica), "h1 { color: tomato; }");
//! # Ok(())
//! # }
//! ```

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::host::Host;
use crate::id::{NodeId, SheetId};
use crate::replica::ReplicaStore;
use crate::scope::Scope;
use crate::sheet::StyleSheet;
use crate::trace::{TraceSink, Tracer};

/// Tags handed to engines so sheet handles cannot cross between them.
static NEXT_ENGINE: AtomicU32 = AtomicU32::new(1);

/// Owns canonical stylesheets and the per-root scopes adopting them.
#[derive(Debug)]
pub struct Engine {
    pub(crate) id: u32,
    pub(crate) config: EngineConfig,
    pub(crate) sheets: Vec<StyleSheet>,
    pub(crate) scopes: BTreeMap<NodeId, Scope>,
    pub(crate) replicas: ReplicaStore,
    pub(crate) tracer: Tracer,
    pub(crate) frame_index: u64,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            id: NEXT_ENGINE.fetch_add(1, Ordering::Relaxed),
            config,
            sheets: Vec::new(),
            scopes: BTreeMap::new(),
            replicas: ReplicaStore::new(),
            tracer: Tracer::none(),
            frame_index: 0,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Routes trace events to `sink`.
    ///
    /// Events are only produced with the `trace` feature enabled.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    /// Returns the number of frames run so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Creates the document scope and connects it if the document is ready.
    ///
    /// Hosts whose document is still loading call
    /// [`document_ready`](Self::document_ready) once it is.
    pub fn install<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        let root = host.document();
        self.scope_for(&*host, root)?;
        if self.is_scope_connected(&*host, root) {
            self.connect_scope(host, root)?;
        }
        Ok(())
    }

    /// Connects the document scope once the document has finished loading.
    pub fn document_ready<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        let root = host.document();
        if self.is_watching(root) || !self.is_scope_connected(&*host, root) {
            return Ok(());
        }
        self.connect_scope(host, root)
    }

    /// Returns the slot of a sheet this engine minted.
    pub(crate) fn sheet_index(&self, id: SheetId) -> Option<usize> {
        let idx = id.idx as usize;
        (id.engine == self.id && idx < self.sheets.len()).then_some(idx)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::dom::{Document, ShadowMode};
    use crate::testing::replica_texts_in;

    #[test]
    fn engines_get_distinct_tags() {
        let mut doc = Document::new();
        let mut a = Engine::new();
        let mut b = Engine::new();
        let sa = a.create_sheet(&mut doc);
        let sb = b.create_sheet(&mut doc);
        assert_ne!(sa.engine(), sb.engine());
        assert!(a.sheet_index(sb).is_none());
        assert_eq!(a.sheet_index(sa), Some(0));
    }

    #[test]
    fn loading_document_connects_when_ready() {
        let mut doc = Document::loading();
        let mut engine = Engine::new();
        engine.install(&mut doc).unwrap();
        let root = doc.root();
        assert!(!engine.is_watching(root));

        let s = engine.create_sheet(&mut doc);
        engine.replace_sync(&mut doc, s, "a {}").unwrap();
        engine.set_adopted_sheets(&mut doc, root, [s]).unwrap();
        assert_eq!(engine.replica_for(s, root), None);

        // Components parsed before the document is ready.
        let host = doc.create_element("x-early");
        let shadow = doc.attach_shadow(host, ShadowMode::Open).unwrap();
        doc.append_child(doc.body(), host).unwrap();
        engine.set_adopted_sheets(&mut doc, shadow, [s]).unwrap();

        doc.finish_loading();
        engine.document_ready(&mut doc).unwrap();
        engine.flush(&mut doc).unwrap();
        assert!(engine.is_watching(root));
        assert!(engine.is_watching(shadow));
        assert_eq!(replica_texts_in(&doc, doc.body()), vec!["a {}"]);
        assert_eq!(replica_texts_in(&doc, shadow), vec!["a {}"]);
    }

    #[test]
    fn empty_scopes_wait_when_configured() {
        let mut doc = Document::new();
        let mut engine = Engine::with_config(EngineConfig {
            connect_empty_scopes: false,
            ..EngineConfig::new()
        });
        engine.install(&mut doc).unwrap();
        let host = doc.create_element("x-empty");
        let shadow = doc.attach_shadow(host, ShadowMode::Open).unwrap();
        doc.append_child(doc.body(), host).unwrap();
        engine.flush(&mut doc).unwrap();
        assert!(!engine.is_watching(shadow));
        assert!(engine.unique_sheets(shadow).is_none());
    }
}
