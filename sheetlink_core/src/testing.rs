// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared test fixtures.

use alloc::string::String;
use alloc::vec::Vec;

use crate::config::EngineConfig;
use crate::dom::{Document, ShadowMode};
use crate::engine::Engine;
use crate::host::Host;
use crate::id::{NodeId, SheetId};

/// A loaded document with an installed engine.
pub(crate) struct Fixture {
    pub(crate) doc: Document,
    pub(crate) engine: Engine,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self::with_config(EngineConfig::new())
    }

    pub(crate) fn with_config(config: EngineConfig) -> Self {
        let mut doc = Document::new();
        let mut engine = Engine::with_config(config);
        engine.install(&mut doc).unwrap();
        Self { doc, engine }
    }

    /// Creates a canonical sheet with `text` as its content.
    pub(crate) fn sheet(&mut self, text: &str) -> SheetId {
        let s = self.engine.create_sheet(&mut self.doc);
        self.engine.replace_sync(&mut self.doc, s, text).unwrap();
        s
    }

    /// Appends an element hosting a shadow root to `parent`.
    pub(crate) fn component(&mut self, parent: NodeId, mode: ShadowMode) -> (NodeId, NodeId) {
        let host = self.doc.create_element("x-component");
        let root = self.doc.attach_shadow(host, mode).unwrap();
        self.doc.append_child(parent, host).unwrap();
        (host, root)
    }

    /// Delivers pending records and runs frames until quiet.
    pub(crate) fn settle(&mut self) {
        self.engine.flush(&mut self.doc).unwrap();
        self.doc.take_frame_request();
    }
}

/// Texts of the style elements directly inside `container`, in order.
pub(crate) fn replica_texts_in(doc: &Document, container: NodeId) -> Vec<String> {
    doc.children(container)
        .filter(|&n| doc.tag_name(n) == Some("style"))
        .map(|n| doc.text_content(n))
        .collect()
}

/// Texts of the style elements in `root`'s replica container.
pub(crate) fn replica_texts(f: &Fixture, root: NodeId) -> Vec<String> {
    match f.doc.adopter_container(root) {
        Some(container) => replica_texts_in(&f.doc, container),
        None => Vec::new(),
    }
}

/// Rule list of `sheet`'s replica in `root`'s scope.
pub(crate) fn replica_rules(f: &Fixture, sheet: SheetId, root: NodeId) -> Vec<String> {
    f.engine
        .replica_for(sheet, root)
        .and_then(|node| f.doc.rules(node))
        .map(<[String]>::to_vec)
        .unwrap_or_default()
}
